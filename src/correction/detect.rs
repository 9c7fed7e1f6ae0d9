use super::registry::CorrectionPairs;

/// (measurement-name suffix, reference channel) naming convention.
pub const REFERENCE_RULES: [(&str, &str); 2] = [("SAUG", "SDREF"), ("AUSP", "ADREF")];

/// Pair every crank-angle channel whose name follows a known convention with
/// its reference, if that reference was recorded. Other channels are left out.
/// Pairs follow the channels' declaration order.
pub fn detect_pairs<'a, I>(ca_names: I) -> CorrectionPairs
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = ca_names.into_iter().collect();
    let mut pairs = CorrectionPairs::new();
    for name in &names {
        let rule = REFERENCE_RULES
            .iter()
            .find(|&&(suffix, reference)| name.ends_with(suffix) && *name != reference);
        if let Some(&(_, reference)) = rule {
            if names.contains(&reference) {
                pairs.insert(*name, reference);
            }
        }
    }
    pairs
}
