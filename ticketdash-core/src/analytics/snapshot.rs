//! Statistics snapshot for a set of ticket records.
//!
//! [`aggregate`] is the single source of truth for every dashboard figure.
//! Callers filter or bucket the records first (see [`super::filter`] and
//! [`super::period`]) and hand the result here.
//!
//! Serialized field names follow the dashboard's stored snapshot format
//! (`totalCards`, `totalAtivos`, `top5Clientes`, ...).

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::counts::CountMap;
use super::normalize::{normalize_client, normalize_label, split_tags};
use crate::config::AnalyticsConfig;
use crate::types::{is_sentinel, Record, NOT_AVAILABLE};

/// Derived statistics for one set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Number of records
    pub total_cards: usize,
    /// Records per working day of one period, one decimal
    pub avg_per_day: String,
    /// Records per working day over every month present, one decimal
    #[serde(rename = "avgPerDayAcrossMonths")]
    pub avg_per_day_across_months: String,

    // Distributions (uppercase-trimmed labels, first-seen order)
    pub by_status: CountMap,
    pub by_work_item: CountMap,
    pub by_tags: CountMap,

    /// Records in a closed/resolved status
    #[serde(rename = "totalFinalizados")]
    pub total_terminal: usize,
    /// Records not in a closed/resolved status
    #[serde(rename = "totalAtivos")]
    pub total_active: usize,
    /// Records in the escalation status
    #[serde(rename = "escalonadoCount")]
    pub escalated_count: usize,

    // Clients
    /// Distinct clients, sentinels excluded
    #[serde(rename = "totalClientesUnicos")]
    pub total_unique_clients: usize,
    /// Busiest client, sentinels excluded
    #[serde(rename = "principalCliente")]
    pub principal_client: String,
    /// Busiest clients, sentinels included
    #[serde(rename = "top5Clientes")]
    pub top_clients: Vec<ClientRanking>,
    pub top_escalated_client: String,
    pub top_escalated_count: usize,
    pub top_resolver_client: String,
    pub top_resolver_count: usize,

    // Work items
    pub principal_work_item_name: String,
    /// Share of the principal work item, percent with one decimal
    #[serde(rename = "principalWorkItemPercentage")]
    pub principal_work_item_pct: String,
    /// Work item with the highest escalation rate, as `"NAME (NN%)"`
    pub top_escalated_work_item: String,

    // Tags
    #[serde(rename = "totalTagsUnicas")]
    pub total_unique_tags: usize,
    pub principal_tag: String,
    #[serde(rename = "top5Tags")]
    pub top_tags: Vec<TagRanking>,
    /// Tag instances per tagged record, one decimal
    pub avg_tags_per_item: String,
    pub top_escalated_tag: String,
    pub top_escalated_tag_count: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            total_cards: 0,
            avg_per_day: format_ratio(0, 0),
            avg_per_day_across_months: format_ratio(0, 0),
            by_status: CountMap::new(),
            by_work_item: CountMap::new(),
            by_tags: CountMap::new(),
            total_terminal: 0,
            total_active: 0,
            escalated_count: 0,
            total_unique_clients: 0,
            principal_client: NOT_AVAILABLE.to_string(),
            top_clients: Vec::new(),
            top_escalated_client: NOT_AVAILABLE.to_string(),
            top_escalated_count: 0,
            top_resolver_client: NOT_AVAILABLE.to_string(),
            top_resolver_count: 0,
            principal_work_item_name: NOT_AVAILABLE.to_string(),
            principal_work_item_pct: format_ratio(0, 0),
            top_escalated_work_item: NOT_AVAILABLE.to_string(),
            total_unique_tags: 0,
            principal_tag: NOT_AVAILABLE.to_string(),
            top_tags: Vec::new(),
            avg_tags_per_item: format_ratio(0, 0),
            top_escalated_tag: NOT_AVAILABLE.to_string(),
            top_escalated_tag_count: 0,
        }
    }
}

/// One row of the top clients table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRanking {
    pub name: String,
    pub count: usize,
    /// The client's most frequent work item
    pub top_work_item: Option<String>,
    /// The client's most frequent tag
    pub top_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRanking {
    pub name: String,
    pub count: usize,
}

/// Compute the snapshot for `records`. Pure; never fails.
///
/// `avg_per_day` is `total / working_days`. `avg_per_day_across_months`
/// divides by `working_days` once per distinct non-blank month label (at
/// least once), so the two agree for a single bucket.
pub fn aggregate<'a, I>(records: I, config: &AnalyticsConfig) -> Snapshot
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut tally = Tally::default();
    for record in records {
        tally.add(record, config);
    }
    tally.into_snapshot(config)
}

#[derive(Debug, Default)]
struct ClientTally {
    count: usize,
    work_items: CountMap,
    tags: CountMap,
}

/// Grouping pass state.
#[derive(Debug, Default)]
struct Tally {
    total: usize,
    terminal: usize,
    escalated: usize,
    tagged_records: usize,
    by_status: CountMap,
    by_work_item: CountMap,
    by_tags: CountMap,
    clients: IndexMap<String, ClientTally>,
    escalated_by_client: CountMap,
    resolved_by_client: CountMap,
    escalated_by_work_item: CountMap,
    escalated_tags: CountMap,
    periods: IndexSet<String>,
}

impl Tally {
    fn add(&mut self, record: &Record, config: &AnalyticsConfig) {
        let status = normalize_label(&record.status);
        let work_item = normalize_label(&record.work_item_type);
        let client = normalize_client(Some(&record.client));
        let tags = split_tags(&record.tags);
        let escalated = config.is_escalated(&record.status);
        let terminal = config.is_terminal(&record.status);

        self.total += 1;
        self.by_status.increment(&status);
        self.by_work_item.increment(&work_item);
        for tag in &tags {
            self.by_tags.increment(tag);
        }
        if !tags.is_empty() {
            self.tagged_records += 1;
        }

        let entry = self.clients.entry(client.clone()).or_default();
        entry.count += 1;
        entry.work_items.increment(&work_item);
        for tag in &tags {
            entry.tags.increment(tag);
        }

        if escalated {
            self.escalated += 1;
            self.escalated_by_work_item.increment(&work_item);
            for tag in &tags {
                self.escalated_tags.increment(tag);
            }
            if !is_sentinel(&client) {
                self.escalated_by_client.increment(&client);
            }
        }

        if terminal {
            self.terminal += 1;
            if !is_sentinel(&client) {
                self.resolved_by_client.increment(&client);
            }
        }

        let month = record.month.trim();
        if !month.is_empty() {
            self.periods.insert(month.to_string());
        }
    }

    fn into_snapshot(self, config: &AnalyticsConfig) -> Snapshot {
        let working_days = config.working_days as usize;
        let working_days_all_months = working_days * self.periods.len().max(1);

        let client_counts: CountMap = self
            .clients
            .iter()
            .map(|(name, tally)| (name.clone(), tally.count))
            .collect();
        let named_clients = client_counts.without(is_sentinel);

        let top_clients = client_counts
            .top_n(config.top_n)
            .into_iter()
            .map(|(name, count)| {
                let tally = self.clients.get(name.as_str());
                ClientRanking {
                    top_work_item: tally.and_then(|t| max_label(&t.work_items)),
                    top_tag: tally.and_then(|t| max_label(&t.tags)),
                    name,
                    count,
                }
            })
            .collect();

        let (top_escalated_client, top_escalated_count) = max_or_na(&self.escalated_by_client);
        let (top_resolver_client, top_resolver_count) = max_or_na(&self.resolved_by_client);
        let (principal_work_item_name, principal_work_item_count) = max_or_na(&self.by_work_item);
        let (top_escalated_tag, top_escalated_tag_count) = max_or_na(&self.escalated_tags);

        let top_escalated_work_item =
            match highest_rate(&self.by_work_item, &self.escalated_by_work_item) {
                Some((name, rate)) => format!("{} ({}%)", name, format_rounded(rate, 0)),
                None => NOT_AVAILABLE.to_string(),
            };

        let top_tags = self
            .by_tags
            .top_n(config.top_n)
            .into_iter()
            .map(|(name, count)| TagRanking { name, count })
            .collect();

        Snapshot {
            total_cards: self.total,
            avg_per_day: format_ratio(self.total, working_days),
            avg_per_day_across_months: format_ratio(self.total, working_days_all_months),
            total_terminal: self.terminal,
            total_active: self.total - self.terminal,
            escalated_count: self.escalated,
            total_unique_clients: named_clients.len(),
            principal_client: max_or_na(&named_clients).0,
            top_clients,
            top_escalated_client,
            top_escalated_count,
            top_resolver_client,
            top_resolver_count,
            principal_work_item_pct: format_ratio(principal_work_item_count * 100, self.total),
            principal_work_item_name,
            top_escalated_work_item,
            total_unique_tags: self.by_tags.len(),
            principal_tag: max_or_na(&self.by_tags).0,
            top_tags,
            avg_tags_per_item: format_ratio(self.by_tags.total(), self.tagged_records),
            top_escalated_tag,
            top_escalated_tag_count,
            by_status: self.by_status,
            by_work_item: self.by_work_item,
            by_tags: self.by_tags,
        }
    }
}

fn max_label(counts: &CountMap) -> Option<String> {
    counts.find_max().map(|(label, _)| label.to_string())
}

fn max_or_na(counts: &CountMap) -> (String, usize) {
    counts
        .find_max()
        .map(|(label, count)| (label.to_string(), count))
        .unwrap_or_else(|| (NOT_AVAILABLE.to_string(), 0))
}

/// Label with the highest `hits / totals` percentage.
///
/// A later label only wins with a strictly greater rate; `None` when no label
/// has a positive rate.
fn highest_rate<'a>(totals: &'a CountMap, hits: &CountMap) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (label, total) in totals.iter() {
        if total == 0 {
            continue;
        }
        let rate = hits.get(label) as f64 / total as f64 * 100.0;
        if rate > best.map_or(0.0, |(_, best_rate)| best_rate) {
            best = Some((label, rate));
        }
    }
    best
}

/// `numerator / denominator` with one decimal, `"0.0"` for a zero divisor.
fn format_ratio(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        return "0.0".to_string();
    }
    format_rounded(numerator as f64 / denominator as f64, 1)
}

/// `value` to `decimals` places, halves rounded away from zero.
///
/// `format!` alone rounds exact halves to even (`12.5` → `"12"`).
fn format_rounded(value: f64, decimals: usize) -> String {
    let scale = 10f64.powi(decimals as i32);
    format!("{:.*}", decimals, (value * scale).round() / scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::ticket;
    use crate::types::UNCATEGORIZED;

    fn config() -> AnalyticsConfig {
        AnalyticsConfig::default()
    }

    #[test]
    fn test_empty_records() {
        let records: Vec<Record> = Vec::new();
        let snapshot = aggregate(&records, &config());
        assert_eq!(snapshot, Snapshot::default());
        assert_eq!(snapshot.avg_per_day, "0.0");
        assert_eq!(snapshot.avg_tags_per_item, "0.0");
        assert_eq!(snapshot.principal_work_item_name, "N/A");
        assert_eq!(snapshot.top_escalated_work_item, "N/A");
        assert_eq!(snapshot.top_escalated_client, "N/A");
        assert_eq!(snapshot.top_escalated_count, 0);
        assert!(snapshot.top_clients.is_empty());
    }

    #[test]
    fn test_totals_and_active_invariant() {
        let records = vec![
            ticket("2024-01", "Acme", "Ana", "Bug", "", "Fechado"),
            ticket("2024-01", "Acme", "Ana", "Bug", "", "Resolvido"),
            ticket("2024-01", "Beta", "Ana", "Task", "", "Novo"),
            ticket("2024-01", "Beta", "Ana", "Task", "", "Escalonado Engenharia"),
            ticket("2024-01", "Beta", "Ana", "Task", "", "fechado"),
        ];
        let snapshot = aggregate(&records, &config());

        assert_eq!(snapshot.total_cards, 5);
        assert_eq!(snapshot.total_terminal, 3);
        assert_eq!(snapshot.total_active, 2);
        let closed = snapshot.by_status.get("FECHADO");
        let resolved = snapshot.by_status.get("RESOLVIDO");
        assert_eq!(snapshot.total_active + closed + resolved, snapshot.total_cards);
        assert_eq!(snapshot.escalated_count, 1);
    }

    #[test]
    fn test_status_and_work_item_labels() {
        let records = vec![
            ticket("", "", "", " bug ", "", "novo"),
            ticket("", "", "", "", "", ""),
        ];
        let snapshot = aggregate(&records, &config());

        assert_eq!(snapshot.by_status.get("NOVO"), 1);
        assert_eq!(snapshot.by_status.get(UNCATEGORIZED), 1);
        assert_eq!(snapshot.by_work_item.get("BUG"), 1);
        assert_eq!(snapshot.by_work_item.get(UNCATEGORIZED), 1);
    }

    #[test]
    fn test_tag_fan_out() {
        let records = vec![ticket("", "Acme", "", "Bug", "x, y ,x", "Novo")];
        let snapshot = aggregate(&records, &config());

        assert_eq!(snapshot.by_tags.get("X"), 2);
        assert_eq!(snapshot.by_tags.get("Y"), 1);
        assert_eq!(snapshot.total_unique_tags, 2);
        assert_eq!(snapshot.principal_tag, "X");
        assert_eq!(snapshot.avg_tags_per_item, "3.0");
    }

    #[test]
    fn test_avg_tags_divides_by_tagged_records() {
        let records = vec![
            ticket("", "Acme", "", "Bug", "a, b, c", "Novo"),
            ticket("", "Acme", "", "Bug", "a", "Novo"),
            ticket("", "Acme", "", "Bug", "", "Novo"),
            ticket("", "Acme", "", "Bug", " , ", "Novo"),
        ];
        let snapshot = aggregate(&records, &config());
        assert_eq!(snapshot.avg_tags_per_item, "2.0");
    }

    #[test]
    fn test_avg_per_day() {
        let config = config();
        let one_month: Vec<Record> = (0..42)
            .map(|_| ticket("2024-01", "Acme", "", "Bug", "", "Novo"))
            .collect();
        let snapshot = aggregate(&one_month, &config);
        assert_eq!(snapshot.avg_per_day, "2.0");
        assert_eq!(snapshot.avg_per_day_across_months, "2.0");

        // the daily average ignores the month count; the cross-month one doubles its divisor
        let two_months: Vec<Record> = (0..42)
            .map(|i| {
                let month = if i % 2 == 0 { "2024-01" } else { "2024-02" };
                ticket(month, "Acme", "", "Bug", "", "Novo")
            })
            .collect();
        let snapshot = aggregate(&two_months, &config);
        assert_eq!(snapshot.avg_per_day, "2.0");
        assert_eq!(snapshot.avg_per_day_across_months, "1.0");

        // no month labels still divide by a single period
        let unlabeled = vec![ticket("", "Acme", "", "Bug", "", "Novo"); 21];
        assert_eq!(aggregate(&unlabeled, &config).avg_per_day_across_months, "1.0");
    }

    #[test]
    fn test_halves_round_up() {
        // 5 tag instances over 4 tagged records: 1.25
        let records = vec![
            ticket("", "Acme", "", "Bug", "a, b", "Novo"),
            ticket("", "Acme", "", "Bug", "a", "Novo"),
            ticket("", "Acme", "", "Bug", "a", "Novo"),
            ticket("", "Acme", "", "Bug", "b", "Novo"),
        ];
        assert_eq!(aggregate(&records, &config()).avg_tags_per_item, "1.3");

        // 1 escalated out of 8: 12.5%
        let mut records: Vec<Record> = (0..7)
            .map(|_| ticket("", "Acme", "", "Bug", "", "Novo"))
            .collect();
        records.push(ticket("", "Acme", "", "Bug", "", "Escalonado Engenharia"));
        let snapshot = aggregate(&records, &config());
        assert_eq!(snapshot.top_escalated_work_item, "BUG (13%)");
        assert_eq!(snapshot.principal_work_item_pct, "100.0");
    }

    #[test]
    fn test_format_rounded() {
        assert_eq!(format_rounded(0.25, 1), "0.3");
        assert_eq!(format_rounded(2.5, 0), "3");
        assert_eq!(format_rounded(0.24, 1), "0.2");
        assert_eq!(format_ratio(7, 12), "0.6");
    }

    #[test]
    fn test_unique_clients_exclude_sentinels() {
        let records = vec![
            ticket("", "Geral", "", "Bug", "", "Novo"),
            ticket("", "", "", "Bug", "", "Novo"),
            ticket("", "Acme Corp", "", "Bug", "", "Novo"),
            ticket("", "ACME LTDA", "", "Bug", "", "Novo"),
            ticket("", "Beta", "", "Bug", "", "Novo"),
        ];
        let snapshot = aggregate(&records, &config());

        assert_eq!(snapshot.total_unique_clients, 2);
        assert_eq!(snapshot.principal_client, "ACME");
    }

    #[test]
    fn test_top_clients_rank_and_tie_order() {
        let records = vec![
            ticket("", "Gamma", "", "Bug", "", "Novo"),
            ticket("", "Geral", "", "Task", "", "Novo"),
            ticket("", "Geral", "", "Task", "", "Novo"),
            ticket("", "Beta", "", "Task", "ui", "Novo"),
            ticket("", "Beta", "", "Bug", "ui, api", "Novo"),
            ticket("", "Alpha", "", "Bug", "", "Novo"),
            ticket("", "Delta", "", "Bug", "", "Novo"),
            ticket("", "Omega", "", "Bug", "", "Novo"),
        ];
        let snapshot = aggregate(&records, &config());

        let names: Vec<&str> = snapshot.top_clients.iter().map(|c| c.name.as_str()).collect();
        // sentinels stay in the table; ties keep first-seen order
        assert_eq!(names, vec!["GERAL", "BETA", "GAMMA", "ALPHA", "DELTA"]);

        let beta = &snapshot.top_clients[1];
        assert_eq!(beta.count, 2);
        assert_eq!(beta.top_work_item.as_deref(), Some("TASK"));
        assert_eq!(beta.top_tag.as_deref(), Some("UI"));
        assert_eq!(snapshot.top_clients[2].top_tag, None);
    }

    #[test]
    fn test_top_escalated_and_resolver_clients() {
        let esc = "Escalonado Engenharia";
        let records = vec![
            ticket("", "Geral", "", "Bug", "", esc),
            ticket("", "Geral", "", "Bug", "", esc),
            ticket("", "Geral", "", "Bug", "", esc),
            ticket("", "Acme", "", "Bug", "", esc),
            ticket("", "Beta", "", "Bug", "", esc),
            ticket("", "Beta", "", "Bug", "", esc),
            ticket("", "Acme", "", "Bug", "", "Resolvido"),
            ticket("", "", "", "Bug", "", "Fechado"),
        ];
        let snapshot = aggregate(&records, &config());

        assert_eq!(snapshot.top_escalated_client, "BETA");
        assert_eq!(snapshot.top_escalated_count, 2);
        assert_eq!(snapshot.top_resolver_client, "ACME");
        assert_eq!(snapshot.top_resolver_count, 1);
    }

    #[test]
    fn test_escalation_rate_first_max_wins() {
        let esc = "Escalonado Engenharia";
        let records = vec![
            ticket("", "Acme", "", "Task", "", "Novo"),
            ticket("", "Acme", "", "Bug", "", esc),
            ticket("", "Acme", "", "Bug", "", "Novo"),
            ticket("", "Acme", "", "Task", "", esc),
            ticket("", "Acme", "", "Epic", "", "Novo"),
        ];
        let snapshot = aggregate(&records, &config());
        // TASK and BUG both sit at 50%; TASK was seen first
        assert_eq!(snapshot.top_escalated_work_item, "TASK (50%)");
    }

    #[test]
    fn test_escalation_rate_higher_rate_replaces() {
        let esc = "Escalonado Engenharia";
        let records = vec![
            ticket("", "Acme", "", "Task", "", esc),
            ticket("", "Acme", "", "Task", "", "Novo"),
            ticket("", "Acme", "", "Task", "", "Novo"),
            ticket("", "Acme", "", "Bug", "", esc),
        ];
        let snapshot = aggregate(&records, &config());
        assert_eq!(snapshot.top_escalated_work_item, "BUG (100%)");
    }

    #[test]
    fn test_principal_work_item_share() {
        let records = vec![
            ticket("", "Acme", "", "Bug", "", "Novo"),
            ticket("", "Acme", "", "Task", "", "Novo"),
            ticket("", "Acme", "", "Task", "", "Novo"),
            ticket("", "Acme", "", "Bug", "", "Novo"),
        ];
        let snapshot = aggregate(&records, &config());
        // 2/4 each, first seen wins
        assert_eq!(snapshot.principal_work_item_name, "BUG");
        assert_eq!(snapshot.principal_work_item_pct, "50.0");
    }

    #[test]
    fn test_top_escalated_tag() {
        let esc = "Escalonado Engenharia";
        let records = vec![
            ticket("", "Acme", "", "Bug", "login, sso", esc),
            ticket("", "Acme", "", "Bug", "sso", esc),
            ticket("", "Acme", "", "Bug", "login, login", "Novo"),
        ];
        let snapshot = aggregate(&records, &config());

        assert_eq!(snapshot.top_escalated_tag, "SSO");
        assert_eq!(snapshot.top_escalated_tag_count, 2);
        assert_eq!(snapshot.principal_tag, "LOGIN");
        let top: Vec<(&str, usize)> = snapshot
            .top_tags
            .iter()
            .map(|t| (t.name.as_str(), t.count))
            .collect();
        assert_eq!(top, vec![("LOGIN", 3), ("SSO", 2)]);
    }

    #[test]
    fn test_serialized_field_names() {
        let records = vec![ticket("2024-01", "Acme", "", "Bug", "x", "Novo")];
        let json = serde_json::to_value(aggregate(&records, &config())).unwrap();

        assert_eq!(json["totalCards"], 1);
        assert_eq!(json["avgPerDay"], "0.0");
        assert_eq!(json["totalAtivos"], 1);
        assert_eq!(json["totalClientesUnicos"], 1);
        assert_eq!(json["top5Clientes"][0]["name"], "ACME");
        assert_eq!(json["byTags"]["X"], 1);
    }
}
