//! Per-section enhancement state

use std::fmt;

/// Lifecycle of one section during a decoration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// Untouched page markup
    Raw,
    Enhancing,
    Enhanced,
    /// Terminal; the section keeps its original content
    Failed,
}

impl SectionState {
    /// Move to `next` if the transition is allowed
    pub fn advance(self, next: SectionState) -> SectionState {
        use SectionState::*;
        match (self, next) {
            (Raw, Enhancing) | (Enhancing, Enhanced) | (Enhancing, Failed) => next,
            _ => {
                tracing::debug!("Ignoring section transition {} -> {}", self, next);
                self
            }
        }
    }
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SectionState::Raw => "raw",
            SectionState::Enhancing => "enhancing",
            SectionState::Enhanced => "enhanced",
            SectionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of enhancing one section
#[derive(Debug, Clone)]
pub struct SectionReport {
    /// First class token, if any
    pub kind: Option<String>,
    pub state: SectionState,
    /// Error message when the section failed
    pub error: Option<String>,
}

/// Outcome of a full decoration pass over one page
#[derive(Debug, Clone, Default)]
pub struct PageReport {
    pub sections: Vec<SectionReport>,
    /// Anchors bound to smooth scrolling
    pub anchors: usize,
    /// Whether a copyright line was appended to the footer
    pub footer_stamped: bool,
}

impl PageReport {
    pub fn enhanced(&self) -> usize {
        self.count(SectionState::Enhanced)
    }

    pub fn failed(&self) -> usize {
        self.count(SectionState::Failed)
    }

    fn count(&self, state: SectionState) -> usize {
        self.sections.iter().filter(|s| s.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let state = SectionState::Raw.advance(SectionState::Enhancing);
        assert_eq!(state, SectionState::Enhancing);
        assert_eq!(state.advance(SectionState::Enhanced), SectionState::Enhanced);
        assert_eq!(state.advance(SectionState::Failed), SectionState::Failed);
    }

    #[test]
    fn test_failed_is_terminal() {
        let failed = SectionState::Failed;
        assert_eq!(failed.advance(SectionState::Enhancing), SectionState::Failed);
        assert_eq!(failed.advance(SectionState::Enhanced), SectionState::Failed);
        assert_eq!(
            SectionState::Raw.advance(SectionState::Enhanced),
            SectionState::Raw
        );
    }
}
