use tier1_core::report::{ExceedanceSummary, GroupCount, GroupKey, PivotTable};

pub fn print(summary: &ExceedanceSummary) {
    println!("=== Tier 1 guideline exceedances ===\n");
    println!("  Exceedances: {}\n", summary.exceedances.len());

    if summary.exceedances.is_empty() {
        println!("  No result exceeds its guideline.");
        return;
    }

    for key in GroupKey::ALL {
        print_counts(key.column_name(), summary.counts(key));
    }
    print_pivot(&summary.pivot);
}

fn print_counts(header: &str, counts: &[GroupCount]) {
    let width = counts
        .iter()
        .map(|c| c.key.len())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(10);

    println!("  {:<width$}  fail_count", header, width = width);
    println!("  {}", "-".repeat(width + 12));
    for c in counts {
        println!("  {:<width$}  {:>10}", c.key, c.fail_count, width = width);
    }
    println!();
}

fn print_pivot(pivot: &PivotTable) {
    let width = pivot
        .rows
        .iter()
        .map(|r| r.parameter.len())
        .chain(std::iter::once("parameter".len()))
        .max()
        .unwrap_or(10);

    print!("  {:<width$}", "parameter", width = width);
    for col in &pivot.columns {
        print!("  {:>8}", col);
    }
    println!();
    println!("  {}", "-".repeat(width + pivot.columns.len() * 10));

    for row in &pivot.rows {
        print!("  {:<width$}", row.parameter, width = width);
        for count in &row.counts {
            print!("  {:>8}", count);
        }
        println!();
    }
    println!();
}
