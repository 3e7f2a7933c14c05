//! unonenote CLI - OneNote to Markdown export tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unonenote::{
    convert_page_file, DirectorySource, DocumentSource, ExportReport, Exporter, FsWriter,
    HierarchyScope, ListNumbering, ObjectKind, RenderOptions,
};

#[derive(Parser)]
#[command(name = "unonenote")]
#[command(version)]
#[command(about = "Export OneNote pages and sections to Markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single page XML file to Markdown
    #[command(alias = "md")]
    Page {
        /// Page content XML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Export a notebook, section group or section from an exported notebook directory
    Export {
        /// Directory holding hierarchy.xml, pages/ and resources/
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Notebook to export
        #[arg(long, group = "target")]
        notebook: Option<String>,

        /// Section group to export
        #[arg(long, group = "target")]
        section_group: Option<String>,

        /// Section to export
        #[arg(long, group = "target")]
        section: Option<String>,

        /// Print the export report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show the notebook hierarchy of an exported notebook directory
    Tree {
        /// Directory holding hierarchy.xml
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Print the hierarchy as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct RenderArgs {
    /// Omit the YAML front matter block
    #[arg(long)]
    no_frontmatter: bool,

    /// Number every ordered list item "1."
    #[arg(long)]
    fixed_numbering: bool,

    /// Spaces per nesting level
    #[arg(long, default_value = "2", env = "UNONENOTE_INDENT")]
    indent: usize,

    /// Do not link or write images
    #[arg(long)]
    no_images: bool,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        let numbering = if self.fixed_numbering {
            ListNumbering::Fixed
        } else {
            ListNumbering::Source
        };
        RenderOptions::new()
            .with_frontmatter(!self.no_frontmatter)
            .with_list_numbering(numbering)
            .with_indent_width(self.indent)
            .with_images(!self.no_images)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Page {
            input,
            output,
            render,
        } => cmd_page(&input, output.as_deref(), &render.options()),
        Commands::Export {
            input,
            output,
            notebook,
            section_group,
            section,
            json,
            render,
        } => {
            let target = match (notebook, section_group, section) {
                (Some(name), _, _) => Target::Notebook(name),
                (_, Some(name), _) => Target::SectionGroup(name),
                (_, _, Some(name)) => Target::Section(name),
                _ => Target::All,
            };
            cmd_export(&input, &output, target, json, render.options())
        }
        Commands::Tree { input, json } => cmd_tree(&input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

enum Target {
    All,
    Notebook(String),
    SectionGroup(String),
    Section(String),
}

fn cmd_page(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = convert_page_file(input, options)?;
    let markdown = page.artifact.content();

    if let Some(path) = output {
        fs::write(path, &markdown)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", markdown);
    }

    Ok(())
}

fn cmd_export(
    input: &Path,
    output: &Path,
    target: Target,
    json: bool,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = DirectorySource::open(input)?;
    log::debug!(
        "Exporting from {} to {} with {:?}",
        input.display(),
        output.display(),
        options
    );
    let exporter = Exporter::new(&source).with_options(options);
    let mut writer = FsWriter::new(output);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = match target {
        Target::Notebook(name) => {
            pb.set_message(format!("Exporting notebook {}...", name));
            exporter.export_notebook(&name, &mut writer)?
        }
        Target::SectionGroup(name) => {
            pb.set_message(format!("Exporting section group {}...", name));
            let id = source.resolve_id(HierarchyScope::Sections, ObjectKind::SectionGroup, &name)?;
            exporter.export_section_group(&id, &mut writer)?
        }
        Target::Section(name) => {
            pb.set_message(format!("Exporting section {}...", name));
            exporter.export_section_by_name(&name, &mut writer)?
        }
        Target::All => {
            let tree = source.fetch_tree(None, HierarchyScope::Notebooks)?;
            let mut report = ExportReport::new();
            for notebook in &tree.children {
                let name = notebook.attr("name").unwrap_or_default();
                pb.set_message(format!("Exporting notebook {}...", name));
                report.merge(exporter.export_notebook(name, &mut writer)?);
            }
            report
        }
    };

    pb.finish_and_clear();

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report, output);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("{} page(s) failed", report.pages_failed.len()).into())
    }
}

fn print_report(report: &ExportReport, output: &Path) {
    println!(
        "{} {} pages -> {}",
        "Exported".green().bold(),
        report.pages_written.len(),
        output.display()
    );

    let count = report.pages_written.len();
    for (i, path) in report.pages_written.iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path);
    }

    if report.resources_written > 0 {
        println!("{}: {}", "Images".bold(), report.resources_written);
    }

    for failed in &report.pages_failed {
        println!(
            "{} {} ({}): {}",
            "Failed".red(),
            failed.name,
            failed.id.dimmed(),
            failed.error
        );
    }
}

fn cmd_tree(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = DirectorySource::open(input)?;
    let tree = source.fetch_tree(None, HierarchyScope::Pages)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    fn walk(node: &unonenote::DocumentNode, depth: usize) {
        let name = node.attr("name").unwrap_or_default();
        let label = match node.name.as_str() {
            "Notebook" => name.cyan().bold().to_string(),
            "SectionGroup" => name.blue().to_string(),
            "Section" => name.green().to_string(),
            "Page" => {
                let level: usize = node
                    .attr("pageLevel")
                    .and_then(|l| l.parse().ok())
                    .unwrap_or(1);
                format!("{}{}", "  ".repeat(level.saturating_sub(1)), name)
            }
            _ => String::new(),
        };
        let next = if label.is_empty() {
            depth
        } else {
            println!("{}{}", "  ".repeat(depth), label);
            depth + 1
        };
        for child in &node.children {
            walk(child, next);
        }
    }

    walk(&tree, 0);
    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "unonenote".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("OneNote to Markdown export tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HIERARCHY: &str = r#"<one:Notebooks xmlns:one="http://schemas.microsoft.com/office/onenote/2013/onenote">
  <one:Notebook name="Work" ID="nb1">
    <one:Section name="S" ID="s1">
      <one:Page ID="p1" name="A" pageLevel="1"/>
      <one:Page ID="p2" name="B" pageLevel="2"/>
    </one:Section>
  </one:Notebook>
</one:Notebooks>"#;

    fn page_xml(title: &str) -> String {
        format!(
            r#"<one:Page xmlns:one="http://schemas.microsoft.com/office/onenote/2013/onenote">
  <one:Title><one:OE><one:T><![CDATA[{}]]></one:T></one:OE></one:Title>
</one:Page>"#,
            title
        )
    }

    fn notebook_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hierarchy.xml"), HIERARCHY).unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        for (id, title) in [("p1", "A"), ("p2", "B")] {
            fs::write(
                dir.path().join("pages").join(format!("{}.xml", id)),
                page_xml(title),
            )
            .unwrap();
        }
        dir
    }

    #[test]
    fn test_render_args_options() {
        let args = RenderArgs {
            no_frontmatter: true,
            fixed_numbering: true,
            indent: 4,
            no_images: true,
        };
        let options = args.options();
        assert!(!options.include_frontmatter);
        assert_eq!(options.list_numbering, ListNumbering::Fixed);
        assert_eq!(options.indent_width, 4);
        assert!(!options.extract_images);
    }

    #[test]
    fn test_cmd_page_writes_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.xml");
        let output = dir.path().join("page.md");
        fs::write(&input, page_xml("Hello")).unwrap();

        let options = RenderOptions::default().with_frontmatter(false);
        cmd_page(&input, Some(&output), &options).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "Hello\n");
    }

    #[test]
    fn test_cmd_export_section() {
        let input = notebook_dir();
        let output = TempDir::new().unwrap();

        cmd_export(
            input.path(),
            output.path(),
            Target::Section("S".to_string()),
            true,
            RenderOptions::default(),
        )
        .unwrap();

        assert!(output.path().join("S/A.md").is_file());
        assert!(output.path().join("S/A/B.md").is_file());
    }

    #[test]
    fn test_cmd_export_unknown_notebook() {
        let input = notebook_dir();
        let output = TempDir::new().unwrap();

        let result = cmd_export(
            input.path(),
            output.path(),
            Target::Notebook("Missing".to_string()),
            false,
            RenderOptions::default(),
        );
        assert!(result.is_err());
    }
}
