//! Report output: terminal, markdown and JSON.

use anyhow::Result;
use ticketdash_core::analytics::{
    CountMap, FieldVariation, PeriodSelection, Snapshot, SnapshotField,
};
use ticketdash_core::UserInfo;

/// Everything a report prints.
pub struct Report<'a> {
    pub user: Option<&'a UserInfo>,
    pub period: &'a PeriodSelection,
    pub snapshot: &'a Snapshot,
    pub periods: Vec<&'a str>,
    pub variations: &'a [FieldVariation],
    /// Human description of the active filters, if any
    pub filters: Option<String>,
}

impl Report<'_> {
    fn title(&self) -> String {
        let period = match self.period {
            PeriodSelection::All => "All periods".to_string(),
            PeriodSelection::Month(label) => label.clone(),
        };
        match self.user {
            Some(user) => format!("Ticket Report: {} ({})", period, user.name),
            None => format!("Ticket Report: {}", period),
        }
    }

    /// `" (+10.0%)"` or empty when there is nothing to compare against.
    fn trend(&self, field: SnapshotField) -> String {
        self.variations
            .iter()
            .find(|v| v.field == field)
            .and_then(|v| v.variation)
            .map(|v| format!(" ({})", v))
            .unwrap_or_default()
    }
}

pub fn print_terminal(report: &Report) {
    let stats = report.snapshot;

    // Header
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", report.title());
    println!("╰{}╯", "─".repeat(60));
    if let Some(user) = report.user {
        println!("   {} - {}", user.name, user.role);
    }
    if let Some(filters) = &report.filters {
        println!("   Filters: {}", filters);
    }
    println!();

    if stats.total_cards == 0 {
        println!("  No tickets found for this selection.");
        println!();
        return;
    }

    println!("SUMMARY");
    println!("   Tickets:      {}", stats.total_cards);
    println!(
        "   Avg per day:  {}{}",
        stats.avg_per_day,
        report.trend(SnapshotField::AvgPerDay)
    );
    if *report.period == PeriodSelection::All && report.periods.len() > 1 {
        println!("   Per month day: {}", stats.avg_per_day_across_months);
    }
    println!(
        "   Active:       {}{}",
        stats.total_active,
        report.trend(SnapshotField::TotalActive)
    );
    println!("   Closed:       {}", stats.total_terminal);
    println!("   Escalated:    {}", stats.escalated_count);
    println!();

    println!("CLIENTS");
    println!(
        "   Unique:         {}{}",
        stats.total_unique_clients,
        report.trend(SnapshotField::TotalUniqueClients)
    );
    println!("   Principal:      {}", stats.principal_client);
    println!(
        "   Most escalated: {} ({})",
        stats.top_escalated_client, stats.top_escalated_count
    );
    println!(
        "   Most resolved:  {} ({})",
        stats.top_resolver_client, stats.top_resolver_count
    );
    if !stats.top_clients.is_empty() {
        println!();
        for (i, client) in stats.top_clients.iter().enumerate() {
            println!(
                "   {}. {:<20} {:>5}  {} / {}",
                i + 1,
                client.name,
                client.count,
                client.top_work_item.as_deref().unwrap_or("-"),
                client.top_tag.as_deref().unwrap_or("-"),
            );
        }
    }
    println!();

    println!("WORK ITEMS");
    println!(
        "   Principal:      {} ({}%)",
        stats.principal_work_item_name, stats.principal_work_item_pct
    );
    println!("   Most escalated: {}", stats.top_escalated_work_item);
    print_distribution(&stats.by_work_item);
    println!();

    println!("TAGS");
    println!(
        "   Unique:         {}{}",
        stats.total_unique_tags,
        report.trend(SnapshotField::TotalUniqueTags)
    );
    println!("   Principal:      {}", stats.principal_tag);
    println!("   Per ticket:     {}", stats.avg_tags_per_item);
    println!(
        "   Most escalated: {} ({})",
        stats.top_escalated_tag, stats.top_escalated_tag_count
    );
    for (i, tag) in stats.top_tags.iter().enumerate() {
        println!("   {}. {:<20} {:>5}", i + 1, tag.name, tag.count);
    }
    println!();

    println!("STATUS");
    print_distribution(&stats.by_status);
    println!();

    if report.periods.len() > 1 {
        println!("Periods: {}", report.periods.join(", "));
        println!();
    }
}

fn print_distribution(counts: &CountMap) {
    for (label, count) in counts.iter() {
        println!("   {:<24} {:>5}", label, count);
    }
}

pub fn print_markdown(report: &Report) {
    let stats = report.snapshot;

    println!("# {}", report.title());
    println!();
    if let Some(user) = report.user {
        println!("*{} - {}*", user.name, user.role);
        println!();
    }
    if let Some(filters) = &report.filters {
        println!("**Filters:** {}", filters);
        println!();
    }

    if stats.total_cards == 0 {
        println!("*No tickets found for this selection.*");
        return;
    }

    // Summary table
    println!("## Summary");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Tickets | {} |", stats.total_cards);
    println!(
        "| Avg per day | {}{} |",
        stats.avg_per_day,
        report.trend(SnapshotField::AvgPerDay)
    );
    if *report.period == PeriodSelection::All && report.periods.len() > 1 {
        println!(
            "| Avg per day, per month | {} |",
            stats.avg_per_day_across_months
        );
    }
    println!(
        "| Active | {}{} |",
        stats.total_active,
        report.trend(SnapshotField::TotalActive)
    );
    println!("| Closed | {} |", stats.total_terminal);
    println!("| Escalated | {} |", stats.escalated_count);
    println!(
        "| Unique clients | {}{} |",
        stats.total_unique_clients,
        report.trend(SnapshotField::TotalUniqueClients)
    );
    println!(
        "| Unique tags | {}{} |",
        stats.total_unique_tags,
        report.trend(SnapshotField::TotalUniqueTags)
    );
    println!("| Tags per ticket | {} |", stats.avg_tags_per_item);
    println!();

    println!("## Clients");
    println!();
    println!("- **Principal:** {}", stats.principal_client);
    println!(
        "- **Most escalated:** {} ({})",
        stats.top_escalated_client, stats.top_escalated_count
    );
    println!(
        "- **Most resolved:** {} ({})",
        stats.top_resolver_client, stats.top_resolver_count
    );
    println!();
    if !stats.top_clients.is_empty() {
        println!("| # | Client | Tickets | Top work item | Top tag |");
        println!("|---|--------|---------|---------------|---------|");
        for (i, client) in stats.top_clients.iter().enumerate() {
            println!(
                "| {} | {} | {} | {} | {} |",
                i + 1,
                client.name,
                client.count,
                client.top_work_item.as_deref().unwrap_or("-"),
                client.top_tag.as_deref().unwrap_or("-"),
            );
        }
        println!();
    }

    println!("## Work Items");
    println!();
    println!(
        "- **Principal:** {} ({}%)",
        stats.principal_work_item_name, stats.principal_work_item_pct
    );
    println!("- **Most escalated:** {}", stats.top_escalated_work_item);
    println!();

    println!("## Tags");
    println!();
    println!("- **Principal:** {}", stats.principal_tag);
    println!(
        "- **Most escalated:** {} ({})",
        stats.top_escalated_tag, stats.top_escalated_tag_count
    );
    for (i, tag) in stats.top_tags.iter().enumerate() {
        println!("{}. **{}** - {} tickets", i + 1, tag.name, tag.count);
    }
    println!();

    println!("## Status");
    println!();
    println!("| Status | Tickets |");
    println!("|--------|---------|");
    for (label, count) in stats.by_status.iter() {
        println!("| {} | {} |", label, count);
    }
    println!();

    println!("---");
    println!("*Generated by ticketdash*");
}

pub fn print_json(report: &Report) -> Result<()> {
    let json = serde_json::json!({
        "period": report.period.label(),
        "user": report.user,
        "filters": report.filters,
        "periods": report.periods,
        "snapshot": report.snapshot,
        "variations": report.variations,
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
