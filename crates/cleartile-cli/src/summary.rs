use console::Style;
use cleartile_core::pipeline::{MosaicOutput, PipelineConfig};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn rule(s: &Styles, width: usize) -> String {
    s.title.apply_to("\u{2550}".repeat(width)).to_string()
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();
    let m = &config.mosaic;

    println!();
    println!("  {}", s.title.apply_to("Cleartile Mosaic"));
    println!("  {}", rule(&s, 16));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Manifest"),
        s.path.apply_to(config.manifest.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Name"),
        s.value.apply_to(&config.name)
    );
    println!();

    println!("  {}", s.header.apply_to("Compositing"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Goal"),
        s.value.apply_to(format!("{}%", m.compositor.ideal_percent))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Max days"),
        s.value.apply_to(m.compositor.max_days)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Include"),
        s.value.apply_to(m.compositor.max_images_include)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Search"),
        s.value.apply_to(m.compositor.max_search_images)
    );
    println!();

    if m.harmonization.enabled {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Harmonize"),
            s.method.apply_to(m.harmonization.policy)
        );
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Harmonize"),
            s.disabled.apply_to("disabled")
        );
    }

    if m.blend.feather {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Feather"),
            s.method.apply_to(format!("{} px", m.blend.feather_distance))
        );
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Feather"),
            s.disabled.apply_to("hard cut")
        );
    }
    println!();
}

pub fn print_output_summary(output: &MosaicOutput) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Result"));
    println!("  {}", rule(&s, 6));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Reference"),
        s.value.apply_to(&output.reference_id)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Quality"),
        s.value.apply_to(format!(
            "{:.2}% (reference {:.2}%)",
            output.average_quality, output.initial_quality
        ))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Scanned"),
        s.value.apply_to(output.scanned)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Stopped"),
        s.method.apply_to(output.termination)
    );
    if output.is_pass_through() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Mode"),
            s.disabled.apply_to("pass-through of the reference")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Accepted"));
    for (position, id) in output.processed_indices.iter().zip(&output.accepted_ids) {
        println!(
            "    {:<6}{}",
            s.label.apply_to(position),
            s.value.apply_to(id)
        );
    }
    println!();

    if !output.written.is_empty() {
        println!("  {}", s.header.apply_to("Written"));
        for path in &output.written {
            println!("    {}", s.path.apply_to(path.display()));
        }
        println!();
    }
}
