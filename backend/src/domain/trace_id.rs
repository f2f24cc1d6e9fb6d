//! Per-request trace ids.
//!
//! The HTTP middleware opens a scope for every request; [`Error`] picks the id
//! up when it is built so a failure can be matched to its log lines. Spawned
//! tasks start outside any scope.
//!
//! [`Error`]: crate::domain::Error

use std::fmt;
use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// Identifier shared by the logs, error body and `trace-id` header of one
/// request.
///
/// # Examples
/// ```
/// use adoption_backend::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
///     .parse()
///     .expect("valid UUID");
/// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
/// assert_eq!(observed, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// A fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id of the enclosing request, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_id() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();
        let seen = TraceId::scope(outer, async move {
            let nested = TraceId::scope(inner, async { TraceId::current() }).await;
            (nested, TraceId::current())
        })
        .await;
        assert_eq!(seen, (Some(inner), Some(outer)));
        assert_eq!(TraceId::current(), None);
    }

    #[tokio::test]
    async fn spawned_tasks_start_unscoped() {
        let observed = TraceId::scope(TraceId::generate(), async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("task completes")
        })
        .await;
        assert!(observed.is_none());
    }

    #[rstest]
    #[case("00000000-0000-0000-0000-000000000000", true)]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
    #[case("not-a-trace", false)]
    fn parses_hyphenated_uuids(#[case] raw: &str, #[case] valid: bool) {
        let parsed = raw.parse::<TraceId>();
        assert_eq!(parsed.is_ok(), valid);
        if let Ok(trace_id) = parsed {
            assert_eq!(trace_id.to_string(), raw);
        }
    }
}
