//! Session derivation and memoization.
//!
//! A session is a region plus a credential source, expressed to the `aws`
//! CLI as environment variables. Sessions are created lazily, memoized per
//! `account:role` pair and reused for the life of the [`SessionManager`].
//! Temporary credentials are never refreshed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use kf_runner::{CommandRunner, CommandSpec};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::AwsConfig;
use crate::error::{AwsError, AwsResult};

/// Program used for every AWS call.
pub const DEFAULT_AWS_PROGRAM: &str = "aws";

/// Lifetime requested for assumed-role credentials.
pub const ROLE_SESSION_DURATION_SECONDS: u32 = 3600;

/// Short-lived credentials returned by a role assumption.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    #[serde(default)]
    pub expiration: Option<String>,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Where a session's credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuth {
    /// Ambient credentials of the process.
    Default,
    /// A named local credential profile.
    Profile(String),
    /// Credentials obtained by assuming `role_arn`.
    Assumed {
        role_arn: String,
        credentials: TemporaryCredentials,
    },
}

/// Authenticated handle bound to a region.
#[derive(Clone)]
pub struct AwsSession {
    region: String,
    auth: SessionAuth,
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for AwsSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSession")
            .field("region", &self.region)
            .field("auth", &self.auth)
            .field("program", &self.program)
            .finish()
    }
}

impl AwsSession {
    pub fn new(region: impl Into<String>, auth: SessionAuth, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            region: region.into(),
            auth,
            program: DEFAULT_AWS_PROGRAM.to_string(),
            runner,
        }
    }

    /// Use a different `aws` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn auth(&self) -> &SessionAuth {
        &self.auth
    }

    /// Environment handed to the `aws` CLI for this session.
    pub fn environment(&self) -> Vec<(String, String)> {
        let mut env = vec![
            ("AWS_REGION".to_string(), self.region.clone()),
            ("AWS_DEFAULT_REGION".to_string(), self.region.clone()),
        ];
        match &self.auth {
            SessionAuth::Default => {}
            SessionAuth::Profile(profile) => {
                env.push(("AWS_PROFILE".to_string(), profile.clone()));
            }
            SessionAuth::Assumed { credentials, .. } => {
                env.push(("AWS_ACCESS_KEY_ID".to_string(), credentials.access_key_id.clone()));
                env.push((
                    "AWS_SECRET_ACCESS_KEY".to_string(),
                    credentials.secret_access_key.clone(),
                ));
                env.push(("AWS_SESSION_TOKEN".to_string(), credentials.session_token.clone()));
            }
        }
        env
    }

    /// Invoke `aws <service> <operation> <args...>` and parse its JSON output.
    ///
    /// A non-zero exit becomes [`AwsError::Remote`] carrying the error code
    /// the CLI reported.
    pub fn call(&self, service: &str, operation: &str, args: &[&str]) -> AwsResult<Value> {
        let spec = CommandSpec::new(&self.program)
            .arg(service)
            .arg(operation)
            .args(args.iter().copied())
            .args(["--output", "json", "--region", self.region.as_str()])
            .envs(self.environment());

        debug!(service, operation, region = %self.region, "AWS call");
        let result = self.runner.run(&spec)?;

        if !result.success() {
            return Err(parse_cli_error(&result.stderr));
        }
        if result.stdout.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(&result.stdout)?)
    }
}

/// Turn `aws` CLI stderr into a [`AwsError::Remote`].
///
/// The CLI reports service errors as
/// `An error occurred (Code) when calling the Operation operation: message`.
fn parse_cli_error(stderr: &str) -> AwsError {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"An error occurred \(([^)]+)\)[^:]*:\s*(.*)").expect("error pattern is valid")
    });

    match pattern.captures(stderr) {
        Some(caps) => AwsError::Remote {
            code: caps[1].to_string(),
            message: caps[2].trim().to_string(),
        },
        None => AwsError::Remote {
            code: "CommandFailed".to_string(),
            message: stderr.trim().to_string(),
        },
    }
}

/// Credential exchange used for role assumption.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialExchange: Send + Sync {
    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
        duration_seconds: u32,
    ) -> AwsResult<TemporaryCredentials>;
}

/// Role assumption through `aws sts assume-role` with ambient credentials.
pub struct StsExchange {
    region: String,
    runner: Arc<dyn CommandRunner>,
}

impl StsExchange {
    pub fn new(region: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            region: region.into(),
            runner,
        }
    }
}

impl CredentialExchange for StsExchange {
    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
        duration_seconds: u32,
    ) -> AwsResult<TemporaryCredentials> {
        let failed = |message: String| AwsError::AssumeRoleFailed {
            role_arn: role_arn.to_string(),
            message,
        };

        let session = AwsSession::new(&self.region, SessionAuth::Default, self.runner.clone());
        let duration = duration_seconds.to_string();
        let response = session
            .call(
                "sts",
                "assume-role",
                &[
                    "--role-arn",
                    role_arn,
                    "--role-session-name",
                    session_name,
                    "--duration-seconds",
                    &duration,
                ],
            )
            .map_err(|e| failed(e.to_string()))?;

        let credentials = response
            .get("Credentials")
            .cloned()
            .ok_or_else(|| failed("response carried no Credentials".to_string()))?;
        serde_json::from_value(credentials).map_err(|e| failed(e.to_string()))
    }
}

/// Maps `(account, role)` pairs to memoized sessions.
pub struct SessionManager {
    region: String,
    config: AwsConfig,
    runner: Arc<dyn CommandRunner>,
    exchange: Box<dyn CredentialExchange>,
    session_name: String,
    sessions: HashMap<String, AwsSession>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("region", &self.region)
            .field("session_name", &self.session_name)
            .field("sessions", &self.sessions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SessionManager {
    /// Create a manager that assumes roles through STS.
    pub fn new(region: impl Into<String>, config: AwsConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let region = region.into();
        let exchange = Box::new(StsExchange::new(&region, runner.clone()));
        Self {
            region,
            config,
            runner,
            exchange,
            session_name: format!("kustforge-{}", std::process::id()),
            sessions: HashMap::new(),
        }
    }

    /// Replace the credential exchange.
    pub fn with_exchange(mut self, exchange: Box<dyn CredentialExchange>) -> Self {
        self.exchange = exchange;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn config(&self) -> &AwsConfig {
        &self.config
    }

    /// Number of memoized sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Convert an account alias to an account id.
    ///
    /// Numeric ids pass through; unknown aliases are returned unchanged.
    pub fn resolve_account_id(&self, account: &str) -> String {
        if !account.is_empty() && account.chars().all(|c| c.is_ascii_digit()) {
            return account.to_string();
        }
        self.config
            .account_mappings
            .get(account)
            .cloned()
            .unwrap_or_else(|| account.to_string())
    }

    /// Get or create the session for an account/role pair.
    pub fn get_session(
        &mut self,
        account_id: Option<&str>,
        role_name: Option<&str>,
    ) -> AwsResult<AwsSession> {
        let account_id = account_id
            .filter(|a| !a.is_empty())
            .map(|a| self.resolve_account_id(a));
        let role_name = role_name.filter(|r| !r.is_empty());

        let key = format!(
            "{}:{}",
            account_id.as_deref().unwrap_or("default"),
            role_name.unwrap_or("default")
        );
        if let Some(session) = self.sessions.get(&key) {
            debug!(session = %key, "Reusing session");
            return Ok(session.clone());
        }

        let session = self.create_session(account_id.as_deref(), role_name)?;
        self.sessions.insert(key, session.clone());
        Ok(session)
    }

    fn create_session(&self, account_id: Option<&str>, role_name: Option<&str>) -> AwsResult<AwsSession> {
        let Some(role_name) = role_name else {
            return Ok(AwsSession::new(&self.region, SessionAuth::Default, self.runner.clone()));
        };

        if let Some(profile) = self.config.profile_mappings.get(role_name) {
            debug!(role = role_name, profile = %profile, "Using profile session");
            return Ok(AwsSession::new(
                &self.region,
                SessionAuth::Profile(profile.clone()),
                self.runner.clone(),
            ));
        }

        let role_arn = self.role_arn(account_id, role_name)?;
        info!(role_arn = %role_arn, "Assuming role");
        let credentials =
            self.exchange
                .assume_role(&role_arn, &self.session_name, ROLE_SESSION_DURATION_SECONDS)?;

        Ok(AwsSession::new(
            &self.region,
            SessionAuth::Assumed {
                role_arn,
                credentials,
            },
            self.runner.clone(),
        ))
    }

    /// Resolve a role name to an ARN.
    ///
    /// Literal ARNs pass through, then configured aliases, then
    /// `arn:aws:iam::<account>:role/<name>` when an account is known.
    pub fn role_arn(&self, account_id: Option<&str>, role_name: &str) -> AwsResult<String> {
        if role_name.starts_with("arn:") {
            return Ok(role_name.to_string());
        }
        if let Some(arn) = self.config.role_mappings.get(role_name) {
            return Ok(arn.clone());
        }
        match account_id {
            Some(account) => Ok(format!("arn:aws:iam::{}:role/{}", account, role_name)),
            None => Err(AwsError::UnknownRole(role_name.to_string())),
        }
    }
}
