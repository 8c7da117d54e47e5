use crate::error::{ProviderError, Result, StatsError};
use crate::models::{GameRecord, PlayerId, Season};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Source of per-game statistics for a player and season
#[async_trait]
pub trait GameLogProvider: Send + Sync {
    /// Games in the provider's own order. An empty vec means the player has no games that season.
    async fn fetch_game_log(
        &self,
        player_id: PlayerId,
        season: &Season,
    ) -> std::result::Result<Vec<GameRecord>, ProviderError>;
}

/// Which provider failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryScope {
    /// Only read timeouts are retried; any other failure is returned immediately
    TimeoutsOnly,
    /// Every failure is retried until the last attempt
    AllErrors,
}

impl FromStr for RetryScope {
    type Err = StatsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timeouts" | "timeouts_only" => Ok(RetryScope::TimeoutsOnly),
            "all" | "all_errors" => Ok(RetryScope::AllErrors),
            other => Err(StatsError::Validation(format!(
                "retry scope must be 'timeouts' or 'all', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub pause: Duration,
    pub scope: RetryScope,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            pause: Duration::from_secs(2),
            scope: RetryScope::TimeoutsOnly,
        }
    }
}

/// Fetches a season's game log, applying the retry policy around the provider
#[derive(Clone)]
pub struct StatLogFetcher {
    provider: Arc<dyn GameLogProvider>,
    policy: RetryPolicy,
}

impl StatLogFetcher {
    pub fn new(provider: Arc<dyn GameLogProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the game log for a player's season.
    ///
    /// Returns `NotFound` when the provider has no games, `Timeout` once the
    /// attempt budget is spent on timeouts and `Upstream` for any other failure.
    /// An empty result is final and is not retried.
    pub async fn fetch(&self, player_id: PlayerId, season: &Season) -> Result<Vec<GameRecord>> {
        let attempts = self.policy.attempts.max(1);

        for attempt in 1..=attempts {
            info!(
                "Fetching stats for player {} for season {} (attempt {}/{})",
                player_id, season, attempt, attempts
            );

            match self.provider.fetch_game_log(player_id, season).await {
                Ok(games) if games.is_empty() => {
                    warn!("No data returned for player {} in season {}", player_id, season);
                    return Err(StatsError::NotFound(format!(
                        "No stats found for this player in the {} season",
                        season
                    )));
                }
                Ok(games) => {
                    info!(
                        "Fetched {} games for player {} in season {}",
                        games.len(),
                        player_id,
                        season
                    );
                    return Ok(games);
                }
                Err(ProviderError::Timeout(msg)) => {
                    warn!("Timeout occurred ({}), attempt {}/{}", msg, attempt, attempts);
                }
                Err(ProviderError::Failed(msg)) => {
                    if self.policy.scope == RetryScope::TimeoutsOnly || attempt == attempts {
                        return Err(StatsError::Upstream(msg));
                    }
                    warn!("Error fetching stats: {}, attempt {}/{}", msg, attempt, attempts);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.policy.pause).await;
            }
        }

        Err(StatsError::Timeout { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed sequence of provider outcomes
    struct ScriptedProvider {
        outcomes: Mutex<VecDeque<std::result::Result<Vec<GameRecord>, ProviderError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedProvider {
        fn new(outcomes: Vec<std::result::Result<Vec<GameRecord>, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl GameLogProvider for ScriptedProvider {
        async fn fetch_game_log(
            &self,
            _player_id: PlayerId,
            _season: &Season,
        ) -> std::result::Result<Vec<GameRecord>, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Failed("script exhausted".to_string())))
        }
    }

    fn policy(scope: RetryScope) -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            pause: Duration::ZERO,
            scope,
        }
    }

    fn season() -> Season {
        "2023-24".parse().unwrap()
    }

    fn one_game() -> Vec<GameRecord> {
        vec![GameRecord {
            points: Some(21.0),
            ..Default::default()
        }]
    }

    fn timeout() -> std::result::Result<Vec<GameRecord>, ProviderError> {
        Err(ProviderError::Timeout("read".to_string()))
    }

    #[tokio::test]
    async fn test_returns_games_on_first_success() {
        let provider = ScriptedProvider::new(vec![Ok(one_game())]);
        let fetcher = StatLogFetcher::new(provider.clone(), policy(RetryScope::TimeoutsOnly));

        let games = fetcher.fetch(2544, &season()).await.unwrap();
        assert_eq!(games, one_game());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_retries_timeouts_then_succeeds() {
        let provider = ScriptedProvider::new(vec![timeout(), timeout(), Ok(one_game())]);
        let fetcher = StatLogFetcher::new(provider.clone(), policy(RetryScope::TimeoutsOnly));

        assert!(fetcher.fetch(2544, &season()).await.is_ok());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_timeout_after_budget_exhausted() {
        let provider = ScriptedProvider::new(vec![timeout(), timeout(), timeout(), Ok(one_game())]);
        let fetcher = StatLogFetcher::new(provider.clone(), policy(RetryScope::TimeoutsOnly));

        let err = fetcher.fetch(2544, &season()).await.unwrap_err();
        assert!(matches!(err, StatsError::Timeout { attempts: 3 }));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_log_is_not_found_and_not_retried() {
        let provider = ScriptedProvider::new(vec![Ok(vec![]), Ok(one_game())]);
        let fetcher = StatLogFetcher::new(provider.clone(), policy(RetryScope::AllErrors));

        let err = fetcher.fetch(2544, &season()).await.unwrap_err();
        match err {
            StatsError::NotFound(msg) => assert!(msg.contains("2023-24")),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_other_failure_surfaces_immediately_when_timeouts_only() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::Failed("HTTP 500".to_string())),
            Ok(one_game()),
        ]);
        let fetcher = StatLogFetcher::new(provider.clone(), policy(RetryScope::TimeoutsOnly));

        let err = fetcher.fetch(2544, &season()).await.unwrap_err();
        assert!(matches!(err, StatsError::Upstream(ref m) if m == "HTTP 500"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_errors_scope_retries_failures() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::Failed("HTTP 500".to_string())),
            timeout(),
            Ok(one_game()),
        ]);
        let fetcher = StatLogFetcher::new(provider.clone(), policy(RetryScope::AllErrors));

        assert!(fetcher.fetch(2544, &season()).await.is_ok());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_all_errors_scope_surfaces_last_failure_as_upstream() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::Failed("first".to_string())),
            Err(ProviderError::Failed("second".to_string())),
            Err(ProviderError::Failed("third".to_string())),
        ]);
        let fetcher = StatLogFetcher::new(provider.clone(), policy(RetryScope::AllErrors));

        let err = fetcher.fetch(2544, &season()).await.unwrap_err();
        assert!(matches!(err, StatsError::Upstream(ref m) if m == "third"));
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn test_retry_scope_parse() {
        assert_eq!("timeouts".parse::<RetryScope>().unwrap(), RetryScope::TimeoutsOnly);
        assert_eq!("ALL".parse::<RetryScope>().unwrap(), RetryScope::AllErrors);
        assert!("sometimes".parse::<RetryScope>().is_err());
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.pause, Duration::from_secs(2));
        assert_eq!(policy.scope, RetryScope::TimeoutsOnly);
    }
}
