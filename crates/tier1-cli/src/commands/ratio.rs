use std::path::Path;
use tier1_core::classify::generate_exceedance_table;
use tier1_core::error::Tier1Error;
use tier1_core::output::{write_file, write_rated_table};
use tier1_core::source::csv_dir::read_joined_csv;

pub fn run(input_csv: &Path, output_csv: &Path) -> Result<(), Tier1Error> {
    let rows = read_joined_csv(input_csv)?;
    let table = generate_exceedance_table(&rows);
    let csv = write_rated_table(Vec::new(), &table)?;
    write_file(output_csv, &csv)?;

    let exceeding = table
        .iter()
        .filter(|r| r.exceedance_type.is_exceedance())
        .count();
    eprintln!(
        "Saved {} row(s) ({} outside their guideline) to {}",
        table.len(),
        exceeding,
        output_csv.display()
    );
    Ok(())
}
