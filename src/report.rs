use crate::incidents::{country_aggregate, group_aggregate, Dataset, GroupCount};
use crate::scale::ColorDomain;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u32,
}

/// Aggregates for one year, as both charts would show them
#[derive(Debug, Serialize)]
pub struct Report {
    pub year: i32,
    pub incidents: usize,
    pub skipped_rows: usize,
    /// Count descending, then name
    pub countries: Vec<CountryCount>,
    pub top_groups: Vec<GroupCount>,
    /// `[min, max]` of log10 counts
    pub map_domain: [f64; 2],
    pub bar_domain: [f64; 2],
}

impl Report {
    pub fn new(dataset: &Dataset, year: i32) -> Self {
        let filtered = dataset.filter_year(year);
        let counts = country_aggregate(&filtered);
        let map = ColorDomain::for_map(&counts);
        let top_groups = group_aggregate(&filtered);
        let bars = ColorDomain::for_bars(&top_groups);

        let mut countries: Vec<CountryCount> = counts
            .into_iter()
            .map(|(country, count)| CountryCount { country, count })
            .collect();
        countries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country)));

        Self {
            year,
            incidents: filtered.len(),
            skipped_rows: dataset.skipped(),
            countries,
            top_groups,
            map_domain: [map.min, map.max],
            bar_domain: [bars.min, bars.max],
        }
    }

    fn write_text(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "Year {}: {} incidents", self.year, self.incidents)?;
        if self.skipped_rows > 0 {
            writeln!(out, "({} rows skipped: unparseable year)", self.skipped_rows)?;
        }

        writeln!(out, "\nCountries ({})", self.countries.len())?;
        let width = self.countries.iter().map(|c| c.country.len()).max().unwrap_or(0);
        for c in &self.countries {
            writeln!(out, "  {:<width$}  {:>6}", c.country, c.count, width = width)?;
        }

        writeln!(out, "\nTop groups")?;
        let width = self.top_groups.iter().map(|g| g.group.len()).max().unwrap_or(0);
        for (rank, g) in self.top_groups.iter().enumerate() {
            writeln!(out, "  {:>2}. {:<width$}  {:>6}", rank + 1, g.group, g.count, width = width)?;
        }

        writeln!(
            out,
            "\nMap domain (log10): [{:.3}, {:.3}]",
            self.map_domain[0], self.map_domain[1]
        )?;
        writeln!(out, "Bar domain: [{}, {}]", self.bar_domain[0], self.bar_domain[1])
    }
}

/// Headless mode: print the aggregates for `year` as text or JSON
pub fn run_report(dataset: &Dataset, year: i32, json: bool, out: &mut impl Write) -> Result<()> {
    let report = Report::new(dataset, year);
    if json {
        serde_json::to_writer_pretty(&mut *out, &report).context("Failed to write JSON report")?;
        writeln!(out)?;
    } else {
        report.write_text(out).context("Failed to write report")?;
    }
    Ok(())
}
