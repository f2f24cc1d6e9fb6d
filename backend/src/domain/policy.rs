//! Tunable adoption rules.

/// Policy switches consulted by the application and messaging services.
///
/// # Examples
/// ```
/// use adoption_backend::domain::AdoptionPolicy;
///
/// let policy = AdoptionPolicy::default();
/// assert!(!policy.allow_reapply_after_rejection);
/// assert!(policy.restrict_transcript_reads);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdoptionPolicy {
    /// Whether an applicant may apply again after a rejection for the same pet.
    pub allow_reapply_after_rejection: bool,
    /// Whether only the two parties may read an application's transcript.
    pub restrict_transcript_reads: bool,
}

impl Default for AdoptionPolicy {
    fn default() -> Self {
        Self {
            allow_reapply_after_rejection: false,
            restrict_transcript_reads: true,
        }
    }
}
