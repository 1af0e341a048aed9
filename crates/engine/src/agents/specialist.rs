// src/agents/specialist.rs

/// A worker agent the supervisor can route a question to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Specialist {
    Researcher,
    Coder,
}

impl Specialist {
    pub fn name(&self) -> &'static str {
        match self {
            Specialist::Researcher => "researcher",
            Specialist::Coder => "coder",
        }
    }

    /// Parse a specialist from its routing name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "researcher" => Some(Specialist::Researcher),
            "coder" => Some(Specialist::Coder),
            _ => None,
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Specialist::Researcher => {
                "You are an information specialist with expertise in comprehensive \
                 research. Gather relevant, accurate, and up-to-date information for \
                 the question at hand and present it clearly. Focus exclusively on \
                 information gathering."
            }
            Specialist::Coder => {
                "You are a coder and analyst. You handle questions that involve \
                 calculations, algorithms, or technical problem-solving. Work through \
                 the problem step by step and always state the final result."
            }
        }
    }
}
