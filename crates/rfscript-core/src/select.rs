//! Pattern-based network selection
//!
//! Shell-glob matching (`*`, `?`, `[seq]`) against each loaded network's
//! display name, case-sensitive. Bulk selection is permissive (no match is
//! an empty collection); single-target selection is strict.

use glob::Pattern;
use log::warn;

use crate::error::ExprError;
use crate::files::LoadedSParamFile;
use crate::networks::Networks;

/// Select networks from the pool whose names match `pattern`
///
/// `None` matches every member. A pattern that is not a valid glob matches
/// nothing (mirroring the forgiving behavior of shell-style matchers). With
/// `require_single`, a match count other than one fails with
/// `ExprError::Selection` carrying the pattern and the count.
pub fn select_networks(
    pool: &[LoadedSParamFile],
    pattern: Option<&str>,
    require_single: bool,
) -> Result<Networks, ExprError> {
    let compiled = match pattern {
        None => None,
        Some(p) => match Pattern::new(p) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("pattern \"{}\" is not a valid glob ({}); matching nothing", p, e);
                if require_single {
                    return Err(ExprError::Selection {
                        pattern: p.to_string(),
                        count: 0,
                    });
                }
                return Ok(Networks::default());
            }
        },
    };

    let members: Vec<_> = pool
        .iter()
        .filter(|file| match &compiled {
            None => true,
            Some(c) => c.matches(&file.network.name),
        })
        .map(|file| file.network.clone())
        .collect();

    if require_single && members.len() != 1 {
        return Err(ExprError::Selection {
            pattern: pattern.unwrap_or("*").to_string(),
            count: members.len(),
        });
    }

    Ok(Networks::from_members(members))
}
