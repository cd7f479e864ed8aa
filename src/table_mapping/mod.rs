/// Source tables whose mirror table does not follow the default naming.
///
/// Several Amplify `Lead` tables (one per environment stack) feed the same mirror table.
const TABLE_MAPPINGS: [(&str, &str); 13] = [
    ("firespring-backdoor-actions-dev", "firespring_actions"),
    (
        "firespring-backdoor-extraction-jobs-dev",
        "firespring_extraction_jobs",
    ),
    (
        "firespring-backdoor-network-state-dev",
        "firespring_network_state",
    ),
    ("firespring-backdoor-searches-dev", "firespring_searches"),
    ("firespring-backdoor-segments-dev", "firespring_segments"),
    (
        "firespring-backdoor-traffic-sources-dev",
        "firespring_traffic_sources",
    ),
    ("firespring-backdoor-visitors-dev", "firespring_visitors"),
    ("Lead-sqiqbtbugvfabolqwdt4rz3dla-NONE", "mmp_toledo_leads"),
    ("Lead-h6a66mxndnhc7h3o4kldil67oa-NONE", "mmp_toledo_leads"),
    ("Lead-sfyatimxznhd3nybi6mcbg5ipq-NONE", "mmp_toledo_leads"),
    ("Lead-x5u6a7nejrcfbjj6qld46eamai-NONE", "mmp_toledo_leads"),
    ("Lead-xllvnlnajffmznanpuyhq3pl6i-NONE", "mmp_toledo_leads"),
    ("toledo-consulting-dashboard-data", "toledo_dashboard"),
];

/// Maps a physical source table to the logical table it is mirrored into.
///
/// Exact matches in [`TABLE_MAPPINGS`] always win. Any other name is normalized: every
/// character that is not an ASCII letter or digit becomes `_` and the result is lowercased.
/// Never fails, so an unknown table cannot hold back delivery.
pub fn map_table_name(source_table: &str) -> String {
    if let Some((_, logical)) = TABLE_MAPPINGS
        .iter()
        .find(|(physical, _)| *physical == source_table)
    {
        tracing::debug!(source_table, logical, "table mapped");
        return (*logical).to_owned();
    }

    let logical: String = source_table
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    tracing::info!(
        source_table,
        logical = %logical,
        "no mapping for {source_table}, using {logical}"
    );

    logical
}
