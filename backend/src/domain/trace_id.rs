//! Correlation identifier for one HTTP request.
//!
//! The [`crate::middleware::Trace`] middleware opens a scope per request;
//! anything running inside it, including [`crate::domain::Error`]
//! construction, can read the identifier with [`TraceId::current`].
//! Spawned tasks do not inherit the scope and must re-enter it with
//! [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

/// Response header echoing the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

tokio::task_local! {
    static CURRENT: TraceId;
}

/// Random per-request identifier.
///
/// # Examples
/// ```
/// use wanderlust::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "handling request");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The identifier of the enclosing scope, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` as the current identifier.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let id: TraceId = "3f2b8c1e-0000-4000-8000-000000000001".parse().expect("uuid");
    /// let seen = TraceId::scope(id, async { TraceId::current() }).await;
    /// assert_eq!(seen, Some(id));
    /// # });
    /// ```
    pub async fn scope<F: Future>(trace_id: TraceId, fut: F) -> F::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn inner_scope_shadows_outer() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();
        let (seen_inner, seen_outer) = TraceId::scope(outer, async move {
            let seen_inner = TraceId::scope(inner, async { TraceId::current() }).await;
            (seen_inner, TraceId::current())
        })
        .await;
        assert_eq!(seen_inner, Some(inner));
        assert_eq!(seen_outer, Some(outer));
    }

    #[tokio::test]
    async fn nothing_is_current_outside_a_scope() {
        assert_eq!(TraceId::current(), None);
    }

    #[rstest]
    #[case("not-a-uuid", false)]
    #[case("3f2b8c1e-0000-4000-8000-000000000001", true)]
    fn parsing_accepts_only_uuids(#[case] raw: &str, #[case] ok: bool) {
        let parsed = raw.parse::<TraceId>();
        assert_eq!(parsed.is_ok(), ok);
        if let Ok(id) = parsed {
            assert_eq!(id.to_string(), raw);
        }
    }
}
