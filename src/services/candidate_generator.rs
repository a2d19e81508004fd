//! Candidate time-step generation.
//!
//! Derives the time steps to test and the simulated duration shared by all
//! runs. Every run samples the polarization every `lcm(time steps)`, so all
//! candidates cache the same physical instants and can be compared sample by
//! sample.

use crate::domain::errors::ConfigurationError;
use crate::domain::models::input_deck::{DeckValue, InputDeck};
use crate::domain::models::time_step::{self, TimeStep, AS_PER_FS};
use crate::domain::models::{CandidateSchedule, Field, FieldEnvelope, ScheduleParams};

/// Deck variable: start of the field.
pub const FIELD_START: &str = "Field1_Tstart";
/// Deck variable: total simulated time.
pub const TOTAL_TIME: &str = "NETime";
/// Deck variable: polarization caching interval.
pub const CACHE_TIME: &str = "IOCachetime";

/// Stateless generator of candidate schedules.
pub struct CandidateGenerator;

impl CandidateGenerator {
    /// Build the candidate schedule.
    ///
    /// Fails before anything is run when the decrement does not divide the
    /// maximum step, when the smooth-pulse width is missing, or when the
    /// reference window holds fewer samples than requested.
    pub fn generate(
        params: &ScheduleParams,
        envelope: &FieldEnvelope,
    ) -> Result<CandidateSchedule, ConfigurationError> {
        if params.max_time_step == 0 || params.decrement == 0 {
            return Err(ConfigurationError::InvalidTimeStep(format!(
                "maximum ({}) and decrement ({}) must be positive",
                params.max_time_step, params.decrement
            )));
        }
        if params.count == 0 {
            return Err(ConfigurationError::InvalidTimeStep(
                "at least one candidate is required".to_string(),
            ));
        }
        if params.max_time_step % params.decrement != 0 {
            return Err(ConfigurationError::NonDivisibleTimeStep {
                max: params.max_time_step,
                decrement: params.decrement,
            });
        }

        let field_settling_fs = envelope.settling_time()?;

        let time_steps: Vec<TimeStep> = (0..params.count)
            .map(|i| i64::from(params.max_time_step) - i64::from(i) * i64::from(params.decrement))
            .take_while(|value| *value > 0)
            .filter_map(|value| u32::try_from(value).ok().and_then(TimeStep::new))
            .collect();

        let lcm = time_step::lcm(&time_steps).ok_or(ConfigurationError::TimeStepLcmOverflow)?;
        #[allow(clippy::cast_precision_loss)]
        let lcm_fs = lcm as f64 / AS_PER_FS;
        let total_duration_fs = lcm_fs + field_settling_fs + params.reference_duration_fs;

        if let Some(required) = params.min_time_points {
            let available = params.reference_duration_fs / lcm_fs;
            if available < f64::from(required) {
                return Err(ConfigurationError::TooFewTimePoints {
                    available,
                    required,
                });
            }
        }

        if time_steps.len() < params.count as usize {
            tracing::warn!(
                requested = params.count,
                effective = time_steps.len(),
                "Non-positive candidates dropped"
            );
        }

        tracing::info!(
            field = %envelope,
            candidates = ?time_steps.iter().map(|s| s.attoseconds()).collect::<Vec<_>>(),
            lcm_fs,
            total_duration_fs,
            "Candidate schedule generated"
        );

        Ok(CandidateSchedule {
            time_steps,
            lcm_fs,
            field_settling_fs,
            reference_duration_fs: params.reference_duration_fs,
            total_duration_fs,
        })
    }

    /// Read the field kind, width and direction from the base deck.
    pub fn field_envelope(deck: &InputDeck) -> Result<Field, ConfigurationError> {
        Field::from_deck(deck)
    }

    /// Write the derived timing fields into the base deck.
    ///
    /// The field starts after one common sampling interval, the run lasts the
    /// total duration and polarization is cached once per interval.
    pub fn apply_timing(deck: &mut InputDeck, schedule: &CandidateSchedule) {
        deck.set(FIELD_START, DeckValue::quantity(schedule.lcm_fs, "fs"));
        deck.set(TOTAL_TIME, DeckValue::quantity(schedule.total_duration_fs, "fs"));
        deck.set(
            CACHE_TIME,
            DeckValue::table(vec![schedule.lcm_fs, schedule.lcm_fs], "fs"),
        );
    }
}
