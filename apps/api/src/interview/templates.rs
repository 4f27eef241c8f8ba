//! Fixed role and difficulty tables that shape the interviewer persona.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rendered in place of a role description when the role type is unknown.
pub const FALLBACK_ROLE: &str = "Software Engineer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Devops,
    Cloud,
    Software,
    Data,
    Fullstack,
    Frontend,
    Backend,
}

impl RoleType {
    pub const ALL: [RoleType; 7] = [
        RoleType::Devops,
        RoleType::Cloud,
        RoleType::Software,
        RoleType::Data,
        RoleType::Fullstack,
        RoleType::Frontend,
        RoleType::Backend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Devops => "devops",
            RoleType::Cloud => "cloud",
            RoleType::Software => "software",
            RoleType::Data => "data",
            RoleType::Fullstack => "fullstack",
            RoleType::Frontend => "frontend",
            RoleType::Backend => "backend",
        }
    }

    /// The position description embedded in interviewer and evaluator prompts.
    pub fn description(&self) -> &'static str {
        match self {
            RoleType::Devops => "DevOps Engineer with expertise in CI/CD, Docker, Kubernetes, AWS/Azure/GCP, Infrastructure as Code, monitoring, and automation",
            RoleType::Cloud => "Cloud Engineer specializing in cloud architecture, migration, security, cost optimization, and multi-cloud strategies",
            RoleType::Software => "Software Engineer with knowledge of system design, algorithms, data structures, OOP, and software development best practices",
            RoleType::Data => "Data Engineer with expertise in data pipelines, ETL, big data technologies, SQL, and data warehousing",
            RoleType::Fullstack => "Full Stack Developer proficient in frontend frameworks, backend technologies, databases, and API design",
            RoleType::Frontend => "Frontend Developer with expertise in React, Vue, Angular, CSS, performance optimization, and accessibility",
            RoleType::Backend => "Backend Developer skilled in server-side development, databases, APIs, microservices, and system design",
        }
    }
}

impl FromStr for RoleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleType::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role type '{s}'"))
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a raw role identifier to its description, falling back to a generic title.
pub fn role_description(role_type: &str) -> &'static str {
    role_type
        .parse::<RoleType>()
        .map(|role| role.description())
        .unwrap_or(FALLBACK_ROLE)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn context(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "This is a beginner-level interview for entry-level candidates (0-2 years experience). Ask fundamental questions, be encouraging, and provide hints when needed.",
            Difficulty::Intermediate => "This is an intermediate-level interview for mid-level candidates (2-5 years experience). Ask moderately challenging questions that test practical knowledge and problem-solving.",
            Difficulty::Advanced => "This is an advanced-level interview for senior candidates (5+ years experience). Ask complex questions about architecture, trade-offs, leadership, and deep technical expertise.",
        }
    }

    /// Lenient lookup used by the orchestrator: unknown tiers become intermediate.
    pub fn resolve(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| format!("unknown difficulty '{s}'"))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
