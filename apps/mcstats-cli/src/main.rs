use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mcstats_cache::{ApiConfig, CacheKind, CacheManager, HttpApi, InitOutcome, InitReport};
use mcstats_common::{PlayerUuid, StatId};
use mcstats_persist::FileStore;
use mcstats_render::{
    BlockFaces, BlockIconRenderer, MAX_SAMPLES_PER_AXIS, RenderConfig, ShadingConfig, TextureCache,
    save_png,
};
use mcstats_scene::{
    BlockElement, BlockProps, BoundingBox, Face, HttpTextureProbe, ProbeCache, parse_vec3,
    resolve_tickets, tickets,
};
use mcstats_stats::{StatFormat, StatFormatter};

#[derive(Parser)]
#[command(name = "mcstats", about = "Minecraft server stats: cache sync, inspection and block icons")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Bring the local store up to date with the stats API
    Sync {
        /// JSON file with base_url, timeout_secs, user_agent
        #[arg(short, long, conflicts_with = "base_url")]
        config: Option<PathBuf>,
        /// API base url
        #[arg(short, long)]
        base_url: Option<String>,
        /// Local store file
        #[arg(short, long, default_value = "mcstats.json")]
        store: PathBuf,
        /// Refresh only this player (name or uuid) after syncing
        #[arg(short, long)]
        player: Option<String>,
    },
    /// Print a player's stats from the local store, without network access
    Show {
        /// Local store file
        #[arg(short, long, default_value = "mcstats.json")]
        store: PathBuf,
        /// Player name or uuid
        #[arg(short, long)]
        player: String,
        /// Single stat, e.g. custom/play_time
        #[arg(long)]
        stat: Option<String>,
        /// Format expression applied to --stat, e.g. "value / 20"
        #[arg(short, long, requires = "stat")]
        format: Option<String>,
        /// Decimals for --format
        #[arg(short, long, default_value = "2")]
        decimals: usize,
        /// Suffix for --format
        #[arg(long, default_value = "")]
        suffix: String,
    },
    /// Render an isometric block icon
    Render {
        /// Top face texture (PNG)
        #[arg(long)]
        top: PathBuf,
        /// Side face texture (PNG), used for both visible sides
        #[arg(long)]
        side: PathBuf,
        /// Icon edge length in pixels
        #[arg(long, default_value = "64")]
        size: u32,
        /// Coverage samples per axis
        #[arg(
            long,
            default_value = "4",
            value_parser = clap::value_parser!(u32).range(1..=MAX_SAMPLES_PER_AXIS as i64)
        )]
        samples: u32,
        /// Output PNG
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Print CSS for the face planes of a block
    Css {
        /// Box corner x,y,z
        #[arg(long, default_value = "0,0,0", allow_hyphen_values = true)]
        from: String,
        /// Opposite corner x,y,z
        #[arg(long, default_value = "16,16,16", allow_hyphen_values = true)]
        to: String,
        /// face=url, repeatable
        #[arg(short, long = "texture")]
        textures: Vec<String>,
        /// Check texture urls with HTTP HEAD; missing ones get the placeholder
        #[arg(long)]
        probe: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("mcstats-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", mcstats_common::crate_info());
            println!("persist: {}", mcstats_persist::crate_info());
            println!("cache: {}", mcstats_cache::crate_info());
            println!("stats: {}", mcstats_stats::crate_info());
            println!("render: {}", mcstats_render::crate_info());
            println!("scene: {}", mcstats_scene::crate_info());
        }
        Commands::Sync {
            config,
            base_url,
            store,
            player,
        } => {
            let config = match (config, base_url) {
                (Some(path), _) => ApiConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                (None, Some(url)) => ApiConfig::with_base_url(url),
                (None, None) => bail!("either --config or --base-url is required"),
            };
            runtime()?.block_on(sync(&config, &store, player.as_deref()))?;
        }
        Commands::Show {
            store,
            player,
            stat,
            format,
            decimals,
            suffix,
        } => {
            let store = FileStore::open(&store)
                .with_context(|| format!("opening store {}", store.display()))?;
            let mut manager = CacheManager::offline(store);
            manager.load_offline()?;
            let uuid = resolve_player(&manager, &player)?;
            let name = manager.player(&uuid).map_or("?", |p| p.name.as_str());
            let Some(record) = manager.stats(&uuid) else {
                bail!("no stats stored for {name} ({uuid})");
            };

            match stat {
                Some(stat) => {
                    let id = StatId::parse(&stat)?;
                    let text = match format {
                        Some(expr) => StatFormat::new(&expr, decimals, &suffix)?
                            .apply(record.get_or_zero(&id), Some(record))?,
                        None => StatFormatter::vanilla().format(&id, record)?,
                    };
                    println!("{name} {id}: {text}");
                }
                None => {
                    let formatter = StatFormatter::vanilla();
                    println!("{name} ({uuid})");
                    if let Some(adv) = manager.advancements(&uuid) {
                        println!("  advancements completed: {}", adv.completed_count());
                    }
                    for (id, _) in record.iter() {
                        println!("  {id}: {}", formatter.format(&id, record)?);
                    }
                }
            }
        }
        Commands::Render {
            top,
            side,
            size,
            samples,
            out,
        } => {
            let mut textures = TextureCache::new();
            let top = textures
                .get_or_load(&top)
                .with_context(|| format!("loading {}", top.display()))?;
            let side = textures
                .get_or_load(&side)
                .with_context(|| format!("loading {}", side.display()))?;

            let mut renderer = BlockIconRenderer::new(
                RenderConfig {
                    samples_per_axis: samples,
                },
                ShadingConfig::default(),
            );
            let icon = renderer.render(BlockFaces::top_and_side(&top, &side), size)?;
            save_png(&out, &icon).with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {size}x{size} icon to {}", out.display());
        }
        Commands::Css {
            from,
            to,
            textures,
            probe,
        } => {
            let bounds = BoundingBox::new(parse_vec3(&from)?, parse_vec3(&to)?);
            let mut props = BlockProps::new(bounds);
            for spec in &textures {
                let (face, url) = spec
                    .split_once('=')
                    .with_context(|| format!("expected face=url, got {spec:?}"))?;
                let face: Face = face.parse()?;
                props = if url.is_empty() {
                    props.no_texture(face)
                } else {
                    props.texture(face, url)
                };
            }

            let mut block = BlockElement::new();
            let pending = tickets(&block.update(&props));
            if probe {
                let prober = HttpTextureProbe::with_timeout(Duration::from_secs(5))?;
                let mut cache = ProbeCache::new();
                runtime()?.block_on(resolve_tickets(&mut block, &pending, &prober, &mut cache));
            } else {
                for ticket in &pending {
                    block.resolve_probe(ticket, true);
                }
            }

            for style in block.styles() {
                println!("{}: {}", style.face(), style.css());
            }
        }
    }

    Ok(())
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

fn open_manager(
    store: &Path,
    config: &ApiConfig,
) -> anyhow::Result<CacheManager<HttpApi, FileStore>> {
    let store =
        FileStore::open(store).with_context(|| format!("opening store {}", store.display()))?;
    Ok(CacheManager::new(HttpApi::new(config)?, store))
}

fn resolve_player<A, S>(manager: &CacheManager<A, S>, player: &str) -> anyhow::Result<PlayerUuid>
where
    S: mcstats_persist::KeyValueStore,
{
    if let Ok(uuid) = PlayerUuid::parse(player) {
        return Ok(uuid);
    }
    manager
        .find_by_name(player)
        .with_context(|| format!("no player named {player:?} in the store"))
}

async fn sync(config: &ApiConfig, store: &Path, player: Option<&str>) -> anyhow::Result<()> {
    let mut manager = open_manager(store, config)?;
    let report = manager.init().await?;
    print_report(&report);

    if let Some(player) = player {
        let uuid = resolve_player(&manager, player)?;
        manager.refresh_player(&uuid).await?;
        println!("refreshed {uuid}");
    }
    Ok(())
}

fn print_report(report: &InitReport) {
    println!("server timestamp: {}", report.server_timestamp);
    for kind in CacheKind::ALL {
        match report.outcome(kind) {
            InitOutcome::AlreadyFresh => println!("  {kind}: up to date"),
            InitOutcome::Updated { entries } => println!("  {kind}: updated {entries}"),
        }
    }
}
