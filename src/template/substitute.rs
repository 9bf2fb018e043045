// ABOUTME: Literal substitution of resolved variable ids into raw template text.
// ABOUTME: Sequential, in ResolvedVariables order; later pairs see earlier replacements.

use super::variables::ResolvedVariables;

/// Replace every literal occurrence of each variable id with its resolved
/// value. Substitution is sequential, so a value substituted by an earlier
/// pair is visible to later pairs; the stable iteration order of
/// `ResolvedVariables` keeps the result reproducible.
pub fn substitute(raw: &str, variables: &ResolvedVariables) -> String {
    let mut text = raw.to_string();
    for (id, value) in variables.iter() {
        text = text.replace(id, value);
    }
    text
}
