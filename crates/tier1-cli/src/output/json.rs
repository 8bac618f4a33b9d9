use tier1_core::error::Tier1Error;
use tier1_core::report::ExceedanceSummary;

pub fn print(summary: &ExceedanceSummary) -> Result<(), Tier1Error> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{json}");
    Ok(())
}
