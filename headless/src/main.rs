use common::logger::MyLog;
use common::saveload::{CompressedBincode, Encoder, JSONPretty};
use common::unwrap_or;
use geom::{vec2, vec3, Vec3};
use log::LevelFilter;
use markings::render::text::{FontAtlas, FontdueAtlas};
use markings::render::{
    Assets, DrawSink, DrawStats, GenCtx, LodLevel, LodType, MergedBatch, PrefabInfo, Primitive,
    RenderOwner,
};
use markings::{
    EntranceID, FillerVertex, MarkingID, MarkingManager, PointID, PointPair, RenderConfig,
    StaticRoadGraph, Style, StyleType, TextLine, TreeLine,
};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "markings headless", no_version, author = "by Uriopass")]
struct Opt {
    /// Render config stem, created with defaults if missing
    #[structopt(long, default_value = "render_config")]
    config: String,

    /// Road graph snapshot stem (JSON). A demo intersection is built when not given
    #[structopt(long)]
    road: Option<String>,

    /// Driving lanes per direction of the demo intersection
    #[structopt(long, default_value = "2")]
    lanes: u32,

    /// TTF font to install next to the builtin one
    #[structopt(long, parse(from_os_str))]
    font: Option<PathBuf>,

    /// Saves the generated markings to this stem
    #[structopt(long)]
    save: Option<String>,

    /// Saves as compressed bincode instead of JSON
    #[structopt(long)]
    compress: bool,

    /// Also print debug logs
    #[structopt(short, long)]
    verbose: bool,
}

const N1: EntranceID = EntranceID(1);
const N2: EntranceID = EntranceID(2);
const N3: EntranceID = EntranceID(3);
const N4: EntranceID = EntranceID(4);

fn main() {
    let opt: Opt = Opt::from_args();
    MyLog::init_with_level(if opt.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config = RenderConfig::load(&opt.config);

    let road = match opt.road {
        Some(ref stem) => unwrap_or!(JSONPretty::load::<StaticRoadGraph>(stem), {
            log::error!("road snapshot {} not found", stem);
            return;
        }),
        None => demo_road(opt.lanes),
    };

    let mut assets = Assets::new();
    assets.add_prefab(PrefabInfo::new("lamp", 1.0, vec![(120, 64), (24, 12)]));
    assets.add_prefab(PrefabInfo::new("tree", 4.0, vec![(800, 400), (60, 30)]));
    assets.add_prefab(PrefabInfo::new("fence", 2.5, vec![(48, 24)]));
    if let Some(ref path) = opt.font {
        if let Some(f) = FontdueAtlas::load(path) {
            log::info!("installed font {}", f.name());
            let name = f.name().to_string();
            assets.add_font(name, Box::new(f));
        }
    }

    let mut manager = MarkingManager::new();
    let ids: Vec<MarkingID> = road.ids().collect();
    for id in &ids {
        let m = unwrap_or!(manager.get_or_create(*id, &road), continue);
        if opt.road.is_none() {
            decorate(m, opt.lanes);
        }
    }

    let ctx = GenCtx {
        config: &config,
        assets: &assets,
    };
    let n = manager.update(&ctx);
    log::info!("generated primitives for {} markings", n);

    for id in &ids {
        let data = unwrap_or!(manager.render_data(*id), continue);
        println!(
            "{:?}: {} parts, {} primitives",
            id,
            data.parts().count(),
            data.primitive_count()
        );
        for t in LodType::ALL {
            let groups = data.groups();
            let counts = [LodLevel::NoLod, LodLevel::Lod0, LodLevel::Lod1].map(|l| groups.count(t, l));
            if counts.iter().all(|&c| c == 0) {
                continue;
            }
            print!(
                "  {:<8} nolod {:>4} lod0 {:>4} lod1 {:>4}",
                format!("{:?}", t),
                counts[0],
                counts[1],
                counts[2]
            );
            match groups.batch(t) {
                Some(b) => println!(
                    "  batch: {} objects {} vertices {} triangles",
                    b.data.objects, b.data.vertices, b.data.triangles
                ),
                None => println!(),
            }
        }
    }

    for d in [0.0, config.lod_distance + 1.0, config.max_render_distance + 1.0] {
        let mut sink = StatSink::default();
        let stats = manager.draw(vec3(d, 0.0, 0.0), &config, &mut sink);
        print_draw(d, &stats, &sink);
    }

    if let Some(stem) = opt.save {
        let docs = manager.persisted();
        let saved = if opt.compress {
            CompressedBincode::save(&docs, &stem)
        } else {
            JSONPretty::save(&docs, &stem)
        };
        if saved.is_some() {
            log::info!("saved {} markings to {}", docs.len(), stem);
        }
    }
}

fn demo_road(lanes: u32) -> StaticRoadGraph {
    let mut road = StaticRoadGraph::default();
    road.add_node(
        0,
        Vec3::ZERO,
        &[
            (N1, vec2(1.0, 0.0)),
            (N2, vec2(0.0, 1.0)),
            (N3, vec2(-1.0, 0.0)),
            (N4, vec2(0.0, -1.0)),
        ],
        lanes,
    );
    road.add_segment(1, vec3(20.0, 0.0, 0.0), vec3(120.0, 0.0, 0.0), (N1, EntranceID(5)), lanes);
    road
}

/// Stop lines, crosswalks, lane dividers, a traffic island and a few decorations
fn decorate(m: &mut markings::Marking, lanes: u32) {
    let last = (lanes * 2 + 1) as u8;
    let mid = (lanes + 1) as u8;
    let entrances: Vec<EntranceID> = m.entrances().iter().map(|e| e.id).collect();

    for &e in &entrances {
        let stop = PointPair::new(PointID::enter(e, 1), PointID::enter(e, mid));
        let _ = m.add_stop_line(stop, None);
        let cw = PointPair::new(PointID::crosswalk(e, 1), PointID::crosswalk(e, last));
        let _ = m.add_crosswalk(cw, None);
    }

    if let [a, b, c, d] = entrances[..] {
        let _ = m.add_line(
            PointPair::new(PointID::enter(a, mid), PointID::enter(c, mid)),
            Some(StyleType::RegularDoubleSolid.default_style()),
        );
        let _ = m.add_line(
            PointPair::new(PointID::enter(b, 1), PointID::enter(a, last)),
            Some(Style::RegularTree(TreeLine {
                prefab: Some("tree".to_string()),
                ..Default::default()
            })),
        );
        let _ = m.add_line(
            PointPair::new(PointID::enter(d, 1), PointID::enter(c, last)),
            Some(Style::RegularText(TextLine {
                text: "BUS ONLY".to_string(),
                ..Default::default()
            })),
        );
        let island = vec![
            FillerVertex::Point(PointID::enter(b, 1)),
            FillerVertex::Point(PointID::enter(b, last)),
            FillerVertex::Point(PointID::enter(d, 1)),
            FillerVertex::Point(PointID::enter(d, last)),
        ];
        if let Err(e) = m.add_filler(island, Some(StyleType::FillerGrass.default_style())) {
            log::warn!("demo island not added: {}", e);
        }
    } else if let [a, b] = entrances[..] {
        for i in 1..=last {
            let style = if i == mid {
                StyleType::RegularSolidAndDashed.default_style()
            } else {
                StyleType::RegularDashed.default_style()
            };
            let _ = m.add_line(PointPair::new(PointID::enter(a, i), PointID::enter(b, last + 1 - i)), Some(style));
        }
    }
}

#[derive(Default)]
struct StatSink {
    decals: usize,
    meshes: usize,
    instances: usize,
    texts: usize,
}

impl DrawSink for StatSink {
    fn draw(&mut self, _: RenderOwner, primitive: &Primitive) {
        match primitive {
            Primitive::Dash(_) | Primitive::Area(_) => self.decals += 1,
            Primitive::Mesh(_) => self.meshes += 1,
            Primitive::Network(_) | Primitive::Prop(_) | Primitive::Tree(_) => self.instances += 1,
            Primitive::Text(_) => self.texts += 1,
        }
    }

    fn draw_batch(&mut self, _: MarkingID, batch: &MergedBatch) {
        self.instances += batch.data.objects;
    }
}

fn print_draw(distance: f32, stats: &DrawStats, sink: &StatSink) {
    println!(
        "camera at {:>6.0}m: {} drawn, {} batches, {} culled ({} decals, {} meshes, {} instances, {} texts)",
        distance,
        stats.primitives,
        stats.batches,
        stats.culled,
        sink.decals,
        sink.meshes,
        sink.instances,
        sink.texts
    );
}
