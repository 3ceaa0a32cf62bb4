use anyhow::Context;
use clap::{Parser, Subcommand};
use pathmenu::config::{self, MenuConfig};
use pathmenu::menu::Granularity;
use pathmenu::sim::SimulatedAnimator;
use pathmenu::timing::{TimingFunction, TimingName, TimingPreset};
use pathmenu::{GesturePhase, MenuEvent, PathMenu, Point, Rect, Size};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pathmenu-sim", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of the one in the user config directory
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Width and height of the control's frame
    #[arg(long, default_value_t = 200.0, global = true)]
    frame: f64,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the slot angle and offset of each item.
    Layout {
        #[arg(default_value_t = 5)]
        count: usize,
    },
    /// Expand the menu and print the animation schedule.
    Expand {
        #[arg(default_value_t = 5)]
        count: usize,
        /// Item edge length
        #[arg(long, default_value_t = 40.0)]
        item_size: f64,
        /// Collapse again once expanded
        #[arg(long)]
        round_trip: bool,
    },
    /// Sweep the dial from one pointer angle to another.
    Dial {
        /// Start angle in radians
        #[arg(allow_hyphen_values = true)]
        from: f64,
        /// End angle in radians
        #[arg(allow_hyphen_values = true)]
        to: f64,
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value_t = 10)]
        steps: usize,
        /// Settle on slot steps when released
        #[arg(long)]
        snap: bool,
    },
    /// Sample a timing function.
    Ease {
        name: String,
        #[arg(long, default_value_t = 10)]
        samples: usize,
        #[arg(long)]
        duration: Option<f64>,
        /// Fall back to the zero curve for unknown names instead of failing
        #[arg(long)]
        lenient: bool,
    },
    /// Write the default configuration file.
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { count } => layout(&build_menu(&cli, count, 0.0)?, count),
        Commands::Expand {
            count,
            item_size,
            round_trip,
        } => expand(build_menu(&cli, count, item_size)?, round_trip),
        Commands::Dial {
            from,
            to,
            count,
            steps,
            snap,
        } => {
            let mut menu = build_menu(&cli, count, 40.0)?;
            menu.set_scrollable(true);
            if snap {
                menu.set_scroll_angle_granularity(Granularity::CustomNum);
            }
            dial(menu, from, to, steps)
        }
        Commands::Ease {
            ref name,
            samples,
            duration,
            lenient,
        } => ease(name, samples, duration, lenient),
        Commands::InitConfig => init_config(cli.config),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<MenuConfig> {
    match path {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(config::load_or_default()),
    }
}

fn build_menu(
    cli: &Cli,
    count: usize,
    item_size: f64,
) -> anyhow::Result<PathMenu<SimulatedAnimator>> {
    let config = load_config(cli.config.as_ref())?;
    log::debug!("Using {:?}", config);
    let mut menu = PathMenu::new(
        Rect::new(0.0, 0.0, cli.frame, cli.frame),
        SimulatedAnimator::new(),
    );
    menu.apply_config(&config);
    for _ in 0..count {
        menu.add_item(Size::new(item_size, item_size));
    }
    menu.set_delegate(|event: MenuEvent| println!("event: {}", event));
    Ok(menu)
}

fn layout(menu: &PathMenu<SimulatedAnimator>, count: usize) -> anyhow::Result<()> {
    let geometry = menu.layout().geometry();
    println!(
        "radius {:.3}, arc {:.4} to {:.4}",
        geometry.radius, geometry.start_arc, geometry.end_arc
    );
    for index in 0..count {
        println!(
            "slot {}: angle {:.4} offset {}",
            index,
            geometry.slot_angle(index, count),
            geometry.slot_offset(index, count)
        );
    }
    Ok(())
}

fn expand(mut menu: PathMenu<SimulatedAnimator>, round_trip: bool) -> anyhow::Result<()> {
    if !menu.expand() {
        anyhow::bail!("Menu refused to expand");
    }
    print_schedule(&menu, 0);
    menu.settle_animations();
    print_positions(&menu);

    if round_trip {
        let seen = menu.animator().history().len();
        if !menu.shrink() {
            anyhow::bail!("Menu refused to collapse");
        }
        print_schedule(&menu, seen);
        menu.settle_animations();
        print_positions(&menu);
    }
    Ok(())
}

fn print_schedule(menu: &PathMenu<SimulatedAnimator>, skip: usize) {
    for scheduled in &menu.animator().history()[skip..] {
        let request = &scheduled.request;
        println!(
            "{:>9} {:?} start {:.3}s end {:.3}s",
            request.kind.to_string(),
            request.target,
            scheduled.starts_at(),
            scheduled.ends_at()
        );
    }
}

fn print_positions(menu: &PathMenu<SimulatedAnimator>) {
    println!("t={:.3}s expanded: {}", menu.animator().now(), menu.is_expanded());
    for (index, (_, item)) in menu.items().enumerate() {
        println!(
            "item {}: position {}{}",
            index,
            item.position,
            if item.hidden { " (hidden)" } else { "" }
        );
    }
}

fn dial(
    mut menu: PathMenu<SimulatedAnimator>,
    from: f64,
    to: f64,
    steps: usize,
) -> anyhow::Result<()> {
    let center = menu.container_center();
    let radius = menu.layout().geometry().radius;
    let pointer = |angle: f64| center.offset(Point::polar(radius, angle));
    let steps = steps.max(1);

    menu.dial(GesturePhase::Began, pointer(from));
    for i in 1..=steps {
        let angle = from + (to - from) * i as f64 / steps as f64;
        menu.dial(GesturePhase::Changed, pointer(angle));
        println!("pointer {:.4} rotation {:.4}", angle, menu.rotation());
    }
    menu.dial(GesturePhase::Ended, pointer(to));
    menu.settle_animations();

    println!(
        "final rotation {:.4} (container {:.4})",
        menu.rotation(),
        menu.container_transform().rotation_angle()
    );
    Ok(())
}

fn ease(name: &str, samples: usize, duration: Option<f64>, lenient: bool) -> anyhow::Result<()> {
    let mut timing = if lenient {
        TimingFunction::named(&TimingName::from(name))
    } else {
        TimingFunction::from_preset(TimingPreset::parse(name)?)
    };
    if let Some(duration) = duration {
        timing.set_duration(duration);
    }

    let samples = samples.max(1);
    for i in 0..=samples {
        let x = i as f64 / samples as f64;
        println!("{:.3} {:.6}", x, timing.evaluate(x));
    }
    Ok(())
}

fn init_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => {
            config::write_default_config_to(&path)?;
            path
        }
        None => config::write_default_config()?,
    };
    println!("{}", path.display());
    Ok(())
}
