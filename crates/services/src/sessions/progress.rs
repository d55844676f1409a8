/// Where the learner is in a session, for progress stars and "3 / 5" labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub concluded: usize,
    pub remaining: usize,
    /// 0-based index of the round on screen, if any.
    pub current: Option<usize>,
    pub is_complete: bool,
}
