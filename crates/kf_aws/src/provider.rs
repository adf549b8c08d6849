//! Resource kinds understood by the resolver.

use serde::{Deserialize, Serialize};

/// Kinds of AWS resources a reference can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Rds,
    Elasticache,
    Alb,
    Ecr,
    Secret,
    Acm,
    Waf,
}

impl ResourceKind {
    /// Name used in references (`aws:<name>:...`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Rds => "rds",
            ResourceKind::Elasticache => "elasticache",
            ResourceKind::Alb => "alb",
            ResourceKind::Ecr => "ecr",
            ResourceKind::Secret => "secret",
            ResourceKind::Acm => "acm",
            ResourceKind::Waf => "waf",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "rds" => Some(ResourceKind::Rds),
            "elasticache" => Some(ResourceKind::Elasticache),
            "alb" => Some(ResourceKind::Alb),
            "ecr" => Some(ResourceKind::Ecr),
            "secret" => Some(ResourceKind::Secret),
            "acm" => Some(ResourceKind::Acm),
            "waf" => Some(ResourceKind::Waf),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            ResourceKind::Rds,
            ResourceKind::Elasticache,
            ResourceKind::Alb,
            ResourceKind::Ecr,
            ResourceKind::Secret,
            ResourceKind::Acm,
            ResourceKind::Waf,
        ]
    }

    /// Service name as spelled by the `aws` CLI.
    pub fn service(&self) -> &'static str {
        match self {
            ResourceKind::Rds => "rds",
            ResourceKind::Elasticache => "elasticache",
            ResourceKind::Alb => "elbv2",
            ResourceKind::Ecr => "ecr",
            ResourceKind::Secret => "secretsmanager",
            ResourceKind::Acm => "acm",
            ResourceKind::Waf => "wafv2",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
