//! waygrid-demo: a simulated game host driving both navigator deployments.
//!
//! Usage: `waygrid-demo [seed] [config.json]`. Set `WAYGRID_LOG=debug` to
//! watch the solver.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use waygrid_core::{Point, chebyshev};
use waygrid_dispatch::{
    CostGrid, Dispatcher, LocalNavigator, NavigatorConfig, TaskId, WorkerNavigator, callback,
};

const WIDTH: i32 = 48;
const HEIGHT: i32 = 18;
const AGENTS: usize = 8;
const BUILDINGS: usize = 5;
const TICK: Duration = Duration::from_millis(16);
const DEADLINE: Duration = Duration::from_secs(5);

type Results = Rc<RefCell<Vec<(usize, Option<Vec<Point>>, f64)>>>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `log` records from the library crates are forwarded by the subscriber.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("WAYGRID_LOG").unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    let mut args = std::env::args().skip(1);
    let seed: u64 = match args.next() {
        Some(s) => s.parse()?,
        None => 7,
    };
    let config = match args.next() {
        Some(path) => NavigatorConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => NavigatorConfig::default(),
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let target = Point::new(WIDTH / 2, HEIGHT / 2);
    let grid = CostGrid::from_fn(WIDTH, HEIGHT, |p| {
        chebyshev(p, target) <= 2 || !rng.random_bool(0.25)
    });
    let agents: Vec<Point> = (0..AGENTS).map(|_| random_walkable(&mut rng, &grid)).collect();
    let buildings: Vec<Point> = (0..BUILDINGS).map(|_| random_walkable(&mut rng, &grid)).collect();
    log::info!("map {WIDTH}x{HEIGHT}, seed {seed}, {AGENTS} agents, target {target}");

    let mut local = LocalNavigator::new(grid.clone(), config.clone());
    let results = request_all(&mut local, &buildings, &agents, target);
    let start = Instant::now();
    while local.pending() > 0 && start.elapsed() < DEADLINE {
        local.update(Instant::now());
        thread::sleep(TICK);
    }
    report("local", &results, start.elapsed());

    let mut worker = WorkerNavigator::spawn(grid.clone(), config)?;
    let worker_results = request_all(&mut worker, &buildings, &agents, target);
    let start = Instant::now();
    while worker.pending() > 0 && start.elapsed() < DEADLINE {
        if worker.poll() == 0 {
            thread::sleep(TICK);
        }
    }
    report("worker", &worker_results, start.elapsed());
    worker.shutdown()?;

    if let Some((_, Some(path), _)) = results.borrow().iter().find(|r| r.1.is_some()) {
        print!("{}", render(&grid, &buildings, path, target));
    }
    Ok(())
}

fn random_walkable(rng: &mut StdRng, grid: &CostGrid) -> Point {
    loop {
        let p = Point::new(rng.random_range(0..WIDTH), rng.random_range(0..HEIGHT));
        if grid.is_walkable(p) {
            return p;
        }
    }
}

/// Bias the map, queue one request per agent, then drop the last agent
/// before its path arrives.
fn request_all(
    nav: &mut impl Dispatcher,
    buildings: &[Point],
    agents: &[Point],
    target: Point,
) -> Results {
    nav.bias_walls();
    for &b in buildings {
        nav.mark_obstacle(b);
    }
    let results: Results = Rc::default();
    let mut last = TaskId(0);
    for (i, &from) in agents.iter().enumerate() {
        let sink = Rc::clone(&results);
        last = nav.create_task(
            from,
            target,
            callback(move |path, cost| sink.borrow_mut().push((i, path, cost))),
        );
    }
    nav.cancel_task(last);
    results
}

fn report(label: &str, results: &Results, elapsed: Duration) {
    let results = results.borrow();
    println!("{label}: {} results in {elapsed:.0?}", results.len());
    for (agent, path, cost) in results.iter() {
        match path {
            Some(path) => println!("  agent {agent}: {} steps, cost {cost:.2}", path.len() - 1),
            None => println!("  agent {agent}: unreachable"),
        }
    }
}

fn render(grid: &CostGrid, buildings: &[Point], path: &[Point], target: Point) -> String {
    let mut out = String::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let p = Point::new(x, y);
            let ch = if p == target {
                '@'
            } else if path.contains(&p) {
                '*'
            } else if buildings.contains(&p) {
                'B'
            } else if grid.is_walkable(p) {
                '.'
            } else {
                '#'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
