//! Loading, empty and error states shown in place of a list or a detail view.

use std::fmt;

/// Number of skeleton cards shown while a listing loads.
pub const DEFAULT_SKELETON_CARDS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Grey cards standing in for rows still loading
    Skeleton { cards: usize },
    Empty { message: String },
    /// Query failure with the backend's message
    Error { message: String },
    NotFound { what: String, back: String },
}

impl Placeholder {
    #[must_use]
    pub const fn skeleton() -> Self {
        Self::Skeleton {
            cards: DEFAULT_SKELETON_CARDS,
        }
    }

    #[must_use]
    pub fn empty(message: impl Into<String>) -> Self {
        Self::Empty {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(what: impl Into<String>, back: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            back: back.into(),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skeleton { cards } => {
                for _ in 0..*cards {
                    writeln!(f, "  [░░░░░░░░░░░░]")?;
                }
                Ok(())
            }
            Self::Empty { message } => writeln!(f, "  {message}"),
            Self::Error { message } => writeln!(f, "  ⚠ Erro ao carregar dados: {message}"),
            Self::NotFound { what, back } => {
                writeln!(f, "  {what} não encontrado.")?;
                writeln!(f, "  Voltar para {back}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering() {
        assert_eq!(Placeholder::skeleton().to_string().lines().count(), DEFAULT_SKELETON_CARDS);
        assert_eq!(
            Placeholder::empty("Nenhum evento encontrado").to_string(),
            "  Nenhum evento encontrado\n"
        );
        let missing = Placeholder::not_found("Evento", "/eventos").to_string();
        assert!(missing.contains("Evento não encontrado."));
        assert!(missing.contains("/eventos"));
    }
}
