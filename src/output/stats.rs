//! Console statistics for a finished run

use crate::output::traits::RunSummary;
use crate::workflow::WorkflowResult;

/// Prints the final counts of a run to stdout
pub fn print_statistics(result: &WorkflowResult, summary: Option<&RunSummary>) {
    println!("=== Archive Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs: {}", result.total_urls);
    println!("  Successful captures: {}", result.success_count);
    println!("  Failed captures: {}", result.failure_count);
    println!();

    if let Some(summary) = summary {
        if !summary.by_state.is_empty() {
            println!("Outcomes:");
            // Sort states by count (descending)
            let mut state_counts: Vec<_> = summary.by_state.iter().collect();
            state_counts.sort_by(|a, b| b.1.cmp(a.1));

            for (state, count) in state_counts {
                println!("  {}: {}", state.label(), count);
            }
            println!();
        }
    }

    println!(
        "Success Rate: {:.1}% ({} / {} URLs archived)",
        result.success_rate(),
        result.success_count,
        result.total_urls
    );
}
