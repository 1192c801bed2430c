//! Creates graphs from `keepsim`'s output

// Modules
mod args;

// Imports
use {
	anyhow::Context,
	args::Args,
	clap::Parser,
	itertools::Itertools,
	keepsim::{
		analysis::{self, CDF_STEPS},
		data::Data,
	},
	keepsim_util::logger,
	plotters::prelude::*,
};

/// Color of guide lines
const GUIDE_COLOR: RGBColor = RGBColor(169, 169, 169);

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Then check the sub-command
	match args.sub_cmd {
		args::SubCmd::ColdRateCdf(cmd_args) => {
			let data = Data::read(&cmd_args.input_file).context("Unable to read input file")?;
			self::draw_cold_rate_cdf(&data, &cmd_args.output)?;
		},

		args::SubCmd::MemWaste(cmd_args) => {
			let data = Data::read(&cmd_args.input_file).context("Unable to read input file")?;
			self::draw_mem_waste(&data, cmd_args.baseline_idx, &cmd_args.output)?;
		},
	}

	Ok(())
}

/// Draws the cdf of cold-start rates of every policy
fn draw_cold_rate_cdf(data: &Data, output: &args::Output) -> Result<(), anyhow::Error> {
	let root = SVGBackend::new(&output.file, (output.width, output.height)).into_drawing_area();
	root.fill(&WHITE).context("Unable to fill background")?;

	let mut chart = ChartBuilder::on(&root)
		.margin(10)
		.set_label_area_size(LabelAreaPosition::Left, 60)
		.set_label_area_size(LabelAreaPosition::Bottom, 50)
		.build_cartesian_2d(0.0..105.0, 0.0..1.05)
		.context("Unable to build chart")?;
	chart
		.configure_mesh()
		.x_desc("App Cold Start (%)")
		.y_desc("CDF")
		.draw()
		.context("Unable to draw mesh")?;

	for (idx, policy) in data.policies.iter().enumerate() {
		if policy.cold_rate.is_empty() {
			tracing::warn!(policy = %policy.label, "Policy has no applications, skipping");
			continue;
		}

		let style = Palette99::pick(idx).stroke_width(2);
		let points = analysis::cdf(&policy.cold_rate, CDF_STEPS)
			.into_iter()
			.map(|(rate, fraction)| (rate * 100.0, fraction));
		chart
			.draw_series(LineSeries::new(points, style))
			.context("Unable to draw cdf")?
			.label(&policy.label)
			.legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
	}

	// Guide at the 3rd quartile
	chart
		.draw_series(LineSeries::new([(0.0, 0.75), (105.0, 0.75)], GUIDE_COLOR))
		.context("Unable to draw guide")?;

	chart
		.configure_series_labels()
		.position(SeriesLabelPosition::LowerRight)
		.border_style(BLACK)
		.background_style(WHITE.mix(0.8))
		.draw()
		.context("Unable to draw legend")?;

	root.present().context("Unable to save output file")?;
	tracing::info!(file = ?output.file, "Saved graph");

	Ok(())
}

/// Draws the normalized wasted memory against the cold-start rate, at the 3rd quartile, of every policy
fn draw_mem_waste(data: &Data, baseline_idx: usize, output: &args::Output) -> Result<(), anyhow::Error> {
	let (labels, (cold_rates, mem_wastes)): (Vec<_>, (Vec<_>, Vec<_>)) = data
		.policies
		.iter()
		.map(|policy| {
			let (cold_rate, mem_waste) = analysis::third_quartile(&policy.cold_rate, &policy.mem_waste)
				.with_context(|| format!("Policy {:?} has no applications", policy.label))?;
			Ok::<_, anyhow::Error>((policy.label.as_str(), (cold_rate * 100.0, mem_waste)))
		})
		.collect::<Result<Vec<_>, _>>()?
		.into_iter()
		.unzip();
	let mem_wastes = analysis::normalized(&mem_wastes, baseline_idx)
		.with_context(|| format!("Baseline policy {baseline_idx} is missing or wastes no memory"))?;
	let points = cold_rates.into_iter().zip(mem_wastes).collect::<Vec<_>>();

	let max_cold_rate = points.iter().map(|&(cold_rate, _)| cold_rate).fold(0.0, f64::max);
	let (min_mem_waste, max_mem_waste) = points
		.iter()
		.map(|&(_, mem_waste)| mem_waste)
		.chain([100.0])
		.minmax_by(f64::total_cmp)
		.into_option()
		.unwrap_or((100.0, 100.0));

	let root = SVGBackend::new(&output.file, (output.width, output.height)).into_drawing_area();
	root.fill(&WHITE).context("Unable to fill background")?;

	let mut chart = ChartBuilder::on(&root)
		.margin(10)
		.set_label_area_size(LabelAreaPosition::Left, 60)
		.set_label_area_size(LabelAreaPosition::Bottom, 50)
		.build_cartesian_2d(
			0.0..(1.05 * max_cold_rate + 1.0),
			(min_mem_waste - 5.0)..(max_mem_waste + 5.0),
		)
		.context("Unable to build chart")?;
	chart
		.configure_mesh()
		.x_desc("3rd Quartile App Cold Start (%)")
		.y_desc("Normalized Wasted Memory Time (%)")
		.draw()
		.context("Unable to draw mesh")?;

	// Baseline guide and the line through all policies
	chart
		.draw_series(LineSeries::new(
			[(0.0, 100.0), (1.05 * max_cold_rate + 1.0, 100.0)],
			GUIDE_COLOR,
		))
		.context("Unable to draw guide")?;
	chart
		.draw_series(LineSeries::new(points.iter().copied(), MAGENTA))
		.context("Unable to draw line")?;

	for (idx, (&point, label)) in points.iter().zip(labels).enumerate() {
		let style = Palette99::pick(idx).filled();
		chart
			.draw_series([Circle::new(point, 5, style)])
			.context("Unable to draw point")?
			.label(label)
			.legend(move |pos| Circle::new(pos, 5, style));
	}

	chart
		.configure_series_labels()
		.border_style(BLACK)
		.background_style(WHITE.mix(0.8))
		.draw()
		.context("Unable to draw legend")?;

	root.present().context("Unable to save output file")?;
	tracing::info!(file = ?output.file, "Saved graph");

	Ok(())
}
