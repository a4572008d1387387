use std::{fmt, str::FromStr};

/// The CRUD collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Processes,
    Policies,
    Rules,
}

impl Resource {
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Processes => "processes",
            Resource::Policies => "policies",
            Resource::Rules => "rules",
        }
    }

    pub fn collection_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("/api/{}/{}", self.name(), id)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processes" | "process" => Ok(Resource::Processes),
            "policies" | "policy" => Ok(Resource::Policies),
            "rules" | "rule" => Ok(Resource::Rules),
            other => Err(format!(
                "unknown resource '{other}', expected processes, policies or rules"
            )),
        }
    }
}
