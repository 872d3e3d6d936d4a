use criterion::{black_box, criterion_group, criterion_main, Criterion};
use incident_map::incidents::{country_aggregate, group_aggregate, Dataset, IncidentRecord};
use incident_map::map::{box_country, fill_cells, Viewport, World};

const COUNTRIES: [&str; 8] = [
    "Iraq", "Syria", "Afghanistan", "Pakistan", "India", "Nigeria", "Somalia", "Yemen",
];

fn synthetic_dataset(rows: usize) -> Dataset {
    let records = (0..rows)
        .map(|i| {
            IncidentRecord::new(
                1970 + (i % 50) as i32,
                COUNTRIES[i % COUNTRIES.len()],
                format!("group-{}", i % 37),
            )
        })
        .collect();
    Dataset::from_records(records)
}

/// A 20x10 grid of box countries covering most of the globe
fn synthetic_world() -> World {
    let mut countries = Vec::new();
    for i in 0..20 {
        for j in 0..10 {
            let lon = -180.0 + i as f64 * 18.0;
            let lat = -70.0 + j as f64 * 14.0;
            countries.push(box_country(
                &format!("c{}-{}", i, j),
                (lon + 1.0, lat + 1.0),
                (lon + 17.0, lat + 13.0),
            ));
        }
    }
    World::new(countries)
}

fn bench_aggregation(c: &mut Criterion) {
    let dataset = synthetic_dataset(200_000);

    c.bench_function("filter_year", |b| {
        b.iter(|| dataset.filter_year(black_box(2019)))
    });

    let filtered = dataset.filter_year(2019);
    c.bench_function("country_aggregate", |b| {
        b.iter(|| country_aggregate(black_box(&filtered)))
    });
    c.bench_function("group_aggregate", |b| {
        b.iter(|| group_aggregate(black_box(&filtered)))
    });
}

fn bench_fill_cells(c: &mut Criterion) {
    let world = synthetic_world();
    let viewport = Viewport::new(0.0, 0.0, 1.0, 400, 200);

    c.bench_function("fill_cells_200x50", |b| {
        b.iter(|| fill_cells(black_box(&world), 200, 50, &viewport))
    });
}

criterion_group!(benches, bench_aggregation, bench_fill_cells);
criterion_main!(benches);
