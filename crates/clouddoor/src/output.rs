//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use clouddoor_core::{LocationWithDistance, format_distance, is_openable};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ───────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn yes_no(value: bool, color: bool) -> String {
    match (value, color) {
        (true, true) => "yes".green().bold().to_string(),
        (false, true) => "no".red().to_string(),
        (true, false) => "yes".into(),
        (false, false) => "no".into(),
    }
}

// ── Location view ───────────────────────────────────────────────────

/// Serializable presentation of one location entry.
#[derive(Debug, Serialize)]
pub struct LocationView {
    pub id: String,
    pub name: String,
    pub distance: String,
    pub distance_meters: Option<u32>,
    pub radius_meters: Option<i64>,
    pub openable: bool,
}

impl From<&LocationWithDistance> for LocationView {
    fn from(entry: &LocationWithDistance) -> Self {
        Self {
            id: entry.access_point_id().to_owned(),
            name: entry.name().to_owned(),
            distance: format_distance(entry.distance_meters),
            distance_meters: entry.distance_meters,
            radius_meters: entry.radius_meters(),
            openable: is_openable(entry),
        }
    }
}

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Radius")]
    radius: String,
    #[tabled(rename = "Open")]
    openable: String,
}

impl LocationRow {
    fn new(view: &LocationView, color: bool) -> Self {
        Self {
            name: view.name.clone(),
            id: view.id.clone(),
            distance: view.distance.clone(),
            radius: view
                .radius_meters
                .map_or_else(|| "-".into(), |r| format!("{r}m")),
            openable: yes_no(view.openable, color),
        }
    }
}

/// Render location entries in the chosen format.
pub fn render_locations(
    format: OutputFormat,
    entries: &[LocationWithDistance],
    color: bool,
) -> Result<String, CliError> {
    let views: Vec<LocationView> = entries.iter().map(LocationView::from).collect();
    render_list(
        format,
        &views,
        |v| LocationRow::new(v, color),
        |v| format!("{}\t{}", v.id, v.distance),
    )
}

// ── Render dispatchers ──────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the underlying data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one line per item
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are
/// pre-formatted text rather than a `Tabled` row.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ───────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    if rows.is_empty() {
        return "No locations.".into();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clouddoor_core::{Geolocation, Location};

    fn entry(distance: Option<u32>) -> LocationWithDistance {
        LocationWithDistance {
            location: Location {
                id: "loc-1".into(),
                name: "Office".into(),
                geolocations: vec![Geolocation {
                    id: "geo-1".into(),
                    name: "Entrance".into(),
                    latitude: 46.0,
                    longitude: 14.5,
                    radius: 100,
                }],
            },
            distance_meters: distance,
        }
    }

    #[test]
    fn table_shows_distance_and_openable() {
        let out = render_locations(OutputFormat::Table, &[entry(Some(1500))], false).unwrap();
        assert!(out.contains("Office"));
        assert!(out.contains("1km"));
        assert!(out.contains("100m"));
        assert!(out.contains("no"));
    }

    #[test]
    fn json_carries_raw_and_formatted_distance() {
        let out = render_locations(OutputFormat::JsonCompact, &[entry(Some(40))], false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["distance"], "40m");
        assert_eq!(value[0]["distance_meters"], 40);
        assert_eq!(value[0]["openable"], true);
    }

    #[test]
    fn plain_lists_id_and_distance() {
        let out = render_locations(OutputFormat::Plain, &[entry(None)], false).unwrap();
        assert_eq!(out, "loc-1\tunknown");
    }

    #[test]
    fn empty_table_says_so() {
        let out = render_locations(OutputFormat::Table, &[], false).unwrap();
        assert_eq!(out, "No locations.");
    }
}
