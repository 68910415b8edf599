use std::{error::Error, fmt};

use crate::Fitness;

/// Invalid evolution or genome configuration, detected before the first generation.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("mutation rate {rate} is outside [0, 1]")]
    MutationRateOutOfRange { rate: f64 },
    #[display("elite count {elite_count} exceeds population size {population_size}")]
    EliteCountTooLarge {
        elite_count: usize,
        population_size: usize,
    },
    #[display("population must contain at least one individual")]
    EmptyPopulation,
    #[display("at least one worker thread is required")]
    ZeroThreads,
    #[display("tournament size must be at least 1")]
    TournamentSizeZero,
    #[display("invalid genome parameters: {reason}")]
    Genome { reason: String },
}

impl ConfigError {
    pub fn genome<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Self::Genome {
            reason: reason.into(),
        }
    }
}

/// A genome could not compute its fitness.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvaluationError {
    #[display("genome has no subject to evaluate")]
    MissingSubject,
    #[display("simulation failed: {reason}")]
    Simulation { reason: String },
    #[display("fitness {fitness} is not a finite number")]
    NonFiniteFitness { fitness: Fitness },
}

impl EvaluationError {
    pub fn simulation<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Self::Simulation {
            reason: reason.into(),
        }
    }
}

/// Error returned by a caller-supplied generation hook.
#[derive(Debug)]
pub struct HookError(Box<dyn Error + Send + Sync + 'static>);

impl HookError {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self(error.into())
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for HookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// Which generation hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum HookStage {
    #[display("pre-generation")]
    PreGeneration,
    #[display("post-generation")]
    PostGeneration,
}

/// Failure of an [`Evolution::evolve`](crate::Evolution::evolve) run.
///
/// Every variant is fatal: the run stops at the first failure.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EvolveError {
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("generation {generation}: evaluation of individual #{index} failed: {source}")]
    Evaluation {
        generation: usize,
        index: usize,
        source: EvaluationError,
    },
    #[display("generation {generation}: {stage} hook failed: {source}")]
    Hook {
        generation: usize,
        stage: HookStage,
        source: HookError,
    },
}

impl From<ConfigError> for EvolveError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_error_message_names_generation_and_index() {
        let error = EvolveError::Evaluation {
            generation: 3,
            index: 7,
            source: EvaluationError::simulation("world exploded"),
        };
        assert_eq!(
            error.to_string(),
            "generation 3: evaluation of individual #7 failed: simulation failed: world exploded"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_hook_error_wraps_caller_errors() {
        let error = HookError::new("disk full");
        assert_eq!(error.to_string(), "disk full");

        let error = EvolveError::Hook {
            generation: 0,
            stage: HookStage::PostGeneration,
            source: HookError::new(std::io::Error::other("no space")),
        };
        assert_eq!(
            error.to_string(),
            "generation 0: post-generation hook failed: no space"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let error: EvolveError = ConfigError::ZeroThreads.into();
        assert!(matches!(error, EvolveError::Config(ConfigError::ZeroThreads)));
    }
}
