/// Failures while tokenizing or building a tree from preview markup.
///
/// Callers treat every variant as "leave the markup alone": the preview
/// keeps showing what it showed before.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag { offset: usize },
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("elements nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}
