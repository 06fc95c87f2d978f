use matrix_util::common_io::write_lines;
use matrix_util::vector_stat::{quantiles, round_signif, sd};

/// Reported values are rounded to this many significant figures
pub const SIGNIF_DIGITS: i32 = 3;

/// One named quantity with its uncertainty. `se`, `lower` and `upper`
/// are `None` for statistics computed directly from the data.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub name: Box<str>,
    pub estimate: f64,
    pub se: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl SummaryRow {
    /// A point statistic without standard error or interval
    pub fn observed(name: &str, estimate: f64) -> Self {
        Self {
            name: name.into(),
            estimate,
            se: None,
            lower: None,
            upper: None,
        }
    }

    /// Summarize Monte Carlo draws of a derived quantity by the median,
    /// the standard deviation and the central `confidence` interval
    pub fn from_draws(name: &str, draws: &[f64], confidence: f64) -> Self {
        let tail = (1.0 - confidence) / 2.0;
        let qq = quantiles(draws, &[tail, 0.5, 1.0 - tail]);
        let finite: Vec<f64> = draws.iter().copied().filter(|x| x.is_finite()).collect();
        Self {
            name: name.into(),
            estimate: qq[1],
            se: Some(sd(&finite)),
            lower: Some(qq[0]),
            upper: Some(qq[2]),
        }
    }

    /// Whether `value` falls inside the interval
    pub fn covers(&self, value: f64) -> bool {
        match (self.lower, self.upper) {
            (Some(lb), Some(ub)) => lb <= value && value <= ub,
            _ => false,
        }
    }
}

fn fmt_signif(x: Option<f64>) -> String {
    match x {
        Some(x) => format!("{}", round_signif(x, SIGNIF_DIGITS)),
        None => "NA".to_string(),
    }
}

/// Named rows of estimates, immutable once built
#[derive(Debug, Clone)]
pub struct SummaryTable {
    pub confidence: f64,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn get(&self, name: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.name.as_ref() == name)
    }

    fn header(&self) -> [String; 5] {
        let lo = 100.0 * (1.0 - self.confidence) / 2.0;
        let hi = 100.0 - lo;
        [
            "quantity".to_string(),
            "estimate".to_string(),
            "se".to_string(),
            format!("{}%", round_signif(lo, SIGNIF_DIGITS)),
            format!("{}%", round_signif(hi, SIGNIF_DIGITS)),
        ]
    }

    fn cells(&self) -> Vec<[String; 5]> {
        self.rows
            .iter()
            .map(|r| {
                [
                    r.name.to_string(),
                    fmt_signif(Some(r.estimate)),
                    fmt_signif(r.se),
                    fmt_signif(r.lower),
                    fmt_signif(r.upper),
                ]
            })
            .collect()
    }

    /// Write the rounded table as tab-separated lines with a header
    pub fn to_tsv(&self, file: &str) -> anyhow::Result<()> {
        let lines: Vec<Box<str>> = std::iter::once(self.header())
            .chain(self.cells())
            .map(|cells| cells.join("\t").into_boxed_str())
            .collect();
        write_lines(&lines, file)
    }
}

impl std::fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = self.header();
        let cells = self.cells();
        let width: Vec<usize> = (0..5)
            .map(|k| {
                cells
                    .iter()
                    .map(|c| c[k].len())
                    .chain(std::iter::once(header[k].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for row in std::iter::once(&header).chain(cells.iter()) {
            write!(f, "{:<w$}", row[0], w = width[0])?;
            for k in 1..5 {
                write!(f, "  {:>w$}", row[k], w = width[k])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
