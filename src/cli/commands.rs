use crate::config::ExportOptions;
use crate::error::SheetMapResult;
use crate::excel::{SheetImporter, SheetSummary};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Execute the inspect command
pub fn inspect(input: PathBuf, json: bool, verbose: bool) -> SheetMapResult<()> {
    let mut importer = SheetImporter::open(&input)?;
    let summaries = importer.summarize()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{}", "📊 Sheetmap - Workbook Inspection".bold().green());
    println!("   File:   {}", input.display());
    println!("   Sheets: {}\n", summaries.len());
    print!("{}", render_summaries(&summaries, verbose));

    let total: usize = summaries.iter().map(|s| s.data_rows).sum();
    println!("{}", format!("✅ {} data rows", total).bold().green());
    Ok(())
}

/// Render one block per sheet; verbose output lists every header
fn render_summaries(summaries: &[SheetSummary], verbose: bool) -> String {
    let mut out = String::new();
    for summary in summaries {
        let named = summary.headers.iter().filter(|h| !h.trim().is_empty()).count();
        out.push_str(&format!(
            "   📄 {}: {} columns, {} rows\n",
            summary.name.bright_blue(),
            named,
            summary.data_rows
        ));
        if verbose {
            for (idx, header) in summary.headers.iter().enumerate() {
                if header.trim().is_empty() {
                    continue;
                }
                out.push_str(&format!(
                    "      {:>3}  {}\n",
                    crate::excel::column_letter(summary.first_column + idx),
                    header
                ));
            }
        }
    }
    out.push('\n');
    out
}

/// Execute the defaults command: print or write the default export options
pub fn defaults(output: Option<PathBuf>) -> SheetMapResult<()> {
    let yaml = ExportOptions::default().to_yaml()?;
    match output {
        Some(path) => {
            fs::write(&path, yaml)?;
            println!("{}", "✅ Default options written".bold().green());
            println!("   Options file: {}", path.display());
        }
        None => print!("{}", yaml),
    }
    Ok(())
}

/// Execute the options command: validate an export options file
pub fn options(file: PathBuf) -> SheetMapResult<()> {
    println!("{}", "⚙️  Sheetmap - Export Options".bold().green());
    println!("   File: {}\n", file.display());

    let options = ExportOptions::from_yaml_file(&file)?;

    println!("   max_rows_per_sheet: {}", options.max_rows_per_sheet);
    println!("   header_row_height:  {}", options.header_row_height);
    println!("   column_width:       {}", options.column_width);
    println!("   header_font_size:   {}", options.header_font_size);
    println!(
        "   sheet_name_prefix:  {}",
        options.sheet_name_prefix.as_deref().unwrap_or("(engine default)")
    );
    println!("\n{}", "✅ Options are valid".bold().green());
    Ok(())
}
