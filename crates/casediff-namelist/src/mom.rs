//! MOM parameter file parsing (`MOM_input`, `MOM_override`).
//!
//! One `KEY = value` assignment per line, `!` comments, `#override` directives
//! in override files, and `BLOCK%` ... `%BLOCK` parameter blocks whose keys are
//! reported as `BLOCK%KEY`. Keys keep their case. A key assigned twice keeps
//! the last value, which is also what the model does.

use casediff_types::ParamMap;
use tracing::debug;

use crate::error::{NamelistError, NamelistResult};
use crate::scalar::{find_unquoted, parse_values, strip_comment};

const OVERRIDE_DIRECTIVE: &str = "#override";

/// Parse a MOM parameter file into a flat key → value map.
pub fn parse_mom_params(text: &str) -> NamelistResult<ParamMap> {
    let mut params = ParamMap::new();
    let mut blocks: Vec<String> = Vec::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let mut line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let is_override = line
            .get(..OVERRIDE_DIRECTIVE.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(OVERRIDE_DIRECTIVE));
        if is_override {
            line = line[OVERRIDE_DIRECTIVE.len()..].trim();
        } else if line.starts_with('#') {
            // Other preprocessor-style directives carry no parameters.
            continue;
        }

        if let Some(name) = line.strip_prefix('%') {
            let name = name.trim();
            match blocks.last() {
                Some(open) if open == name => {
                    blocks.pop();
                    continue;
                }
                _ => {
                    return Err(NamelistError::UnbalancedBlock {
                        name: name.to_string(),
                        line: line_no,
                    })
                }
            }
        }

        let Some(eq) = find_unquoted(line, '=') else {
            if let Some(name) = line.strip_suffix('%') {
                blocks.push(name.trim().to_string());
                continue;
            }
            return Err(NamelistError::InvalidAssignment {
                line: line_no,
                text: line.to_string(),
            });
        };

        let key = line[..eq].trim();
        if key.is_empty() {
            return Err(NamelistError::InvalidAssignment {
                line: line_no,
                text: line.to_string(),
            });
        }
        let full_key = if blocks.is_empty() {
            key.to_string()
        } else {
            format!("{}%{key}", blocks.join("%"))
        };
        params.insert(full_key, parse_values(&line[eq + 1..]));
    }

    if let Some(open) = blocks.pop() {
        return Err(NamelistError::UnterminatedBlock { name: open });
    }
    debug!(params = params.len(), "parsed MOM parameter file");
    Ok(params)
}
