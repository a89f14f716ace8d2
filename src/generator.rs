//! Generation orchestration: fan out `count` independent calls, pick one
//! candidate per call, clean up the raw completions, and join the survivors.

use futures::future::join_all;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::SenryuError;
use crate::llm::generate_candidates;
use crate::{LLMParams, TARGET_LLM_REQUEST};

/// The sampling temperature wanders around its base so identical inputs do
/// not collapse onto one phrasing.
const TEMPERATURE_JITTER: f32 = 0.1;
const TEMPERATURE_MIN: f32 = 0.2;
const TEMPERATURE_MAX: f32 = 1.2;

/// Result of one generation attempt.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub text: String,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
}

/// Issue `count` independent generation calls and reduce them to one result
/// string. Calls run concurrently but the joined text preserves issue order.
/// Partial failures are absorbed; the whole batch fails only when no call
/// produced usable text.
pub async fn generate_batch<R: Rng>(
    params: &LLMParams,
    system: &str,
    instruction: &str,
    count: u32,
    candidates_per_call: u8,
    rng: &mut R,
) -> Result<String, SenryuError> {
    // Jitter temperatures up front so the calls stay mutually independent.
    let temperatures: Vec<f32> = (0..count)
        .map(|_| jitter_temperature(params.temperature, rng))
        .collect();

    let calls = temperatures.into_iter().map(|temperature| {
        let call_params = LLMParams {
            temperature,
            ..params.clone()
        };
        async move { generate_candidates(&call_params, system, instruction, candidates_per_call).await }
    });

    let results = join_all(calls).await;
    reduce_outcomes(results, rng)
}

/// Reduce the per-call results to one string, in issue order. All-empty
/// output maps to `EmptyGeneration`; if nothing survived and a transport
/// failure occurred, that wins as `UpstreamError`.
fn reduce_outcomes<R: Rng>(
    results: Vec<anyhow::Result<Vec<String>>>,
    rng: &mut R,
) -> Result<String, SenryuError> {
    let mut outcomes: Vec<GenerationOutcome> = Vec::with_capacity(results.len());
    let mut transport_failure: Option<String> = None;

    for result in results {
        match result {
            Ok(candidates) => {
                let raw = pick_candidate(&candidates, rng).cloned().unwrap_or_default();
                let text = shape_three_lines(&clean_completion(&raw));
                if text.is_empty() {
                    debug!(target: TARGET_LLM_REQUEST, "Discarding empty completion");
                    outcomes.push(GenerationOutcome {
                        text,
                        succeeded: false,
                        failure_reason: Some("empty completion".to_string()),
                    });
                } else {
                    outcomes.push(GenerationOutcome {
                        text,
                        succeeded: true,
                        failure_reason: None,
                    });
                }
            }
            Err(err) => {
                warn!(target: TARGET_LLM_REQUEST, "Generation attempt failed: {}", err);
                transport_failure = Some(err.to_string());
                outcomes.push(GenerationOutcome {
                    text: String::new(),
                    succeeded: false,
                    failure_reason: Some(err.to_string()),
                });
            }
        }
    }

    let surviving: Vec<&str> = outcomes
        .iter()
        .filter(|outcome| outcome.succeeded)
        .map(|outcome| outcome.text.as_str())
        .collect();

    if surviving.is_empty() {
        return Err(match transport_failure {
            Some(detail) => SenryuError::UpstreamError(detail),
            None => {
                let reason = outcomes
                    .iter()
                    .rev()
                    .find_map(|outcome| outcome.failure_reason.clone());
                SenryuError::EmptyGeneration(reason)
            }
        });
    }

    Ok(surviving.join("\n"))
}

/// Pick one candidate uniformly at random. This is the pipeline's only
/// deliberate source of output diversity beyond backend sampling.
pub fn pick_candidate<'a, R: Rng>(candidates: &'a [String], rng: &mut R) -> Option<&'a String> {
    if candidates.is_empty() {
        None
    } else {
        Some(&candidates[rng.random_range(0..candidates.len())])
    }
}

/// Wander the base temperature by up to ±0.1, clamped to a sane range.
pub fn jitter_temperature<R: Rng>(base: f32, rng: &mut R) -> f32 {
    let jitter = rng.random_range(-TEMPERATURE_JITTER..=TEMPERATURE_JITTER);
    (base + jitter).clamp(TEMPERATURE_MIN, TEMPERATURE_MAX)
}

/// Post-process a raw completion: trim, strip one wrapping code fence, then
/// strip one wrapping layer of quotes (ASCII or Japanese brackets).
///
/// Exactly one quote layer comes off per call, so doubly-wrapped input keeps
/// its inner layer; re-applying the cleanup to its own output is a no-op for
/// anything a single pass produced.
pub fn clean_completion(raw: &str) -> String {
    let text = strip_code_fence(raw.trim());
    strip_quote_layer(&text)
}

fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() > 6 {
        let inner = &trimmed[3..trimmed.len() - 3];
        // Drop an optional language tag on the opening fence.
        let inner = match inner.find('\n') {
            Some(pos) if inner[..pos].chars().all(|c| c.is_ascii_alphanumeric()) => {
                &inner[pos + 1..]
            }
            _ => inner,
        };
        inner.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn strip_quote_layer(text: &str) -> String {
    let trimmed = text.trim();
    for (open, close) in [("\"", "\""), ("'", "'"), ("「", "」"), ("『", "』")] {
        if trimmed.len() > open.len() + close.len()
            && trimmed.starts_with(open)
            && trimmed.ends_with(close)
        {
            return trimmed[open.len()..trimmed.len() - close.len()]
                .trim()
                .to_string();
        }
    }
    trimmed.to_string()
}

/// Reshape a completion toward three lines: keep the first three non-empty
/// lines, or re-split short output into chunks of at most seven characters.
pub fn shape_three_lines(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() >= 3 {
        return lines[..3].join("\n");
    }

    let chars: Vec<char> = lines.concat().chars().collect();
    chars
        .chunks(7)
        .take(3)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join("\n")
}
