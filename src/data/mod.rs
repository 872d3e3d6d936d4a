use crate::error::LoadError;
use crate::map::{Country, Polygon, Ring, World};
use geojson::{GeoJson, Geometry, Value};
use glam::DVec2;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Load the country FeatureCollection used by the choropleth
pub fn load_world(path: &Path) -> Result<World, LoadError> {
    let start = Instant::now();
    let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let geojson = GeoJson::from_json_value(value).map_err(|source| LoadError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    let world = world_from_geojson(geojson, path)?;
    info!(
        path = %path.display(),
        countries = world.len(),
        "world map loaded in {:.1}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(world)
}

/// Build the world from parsed GeoJSON. `origin` is only used in messages.
pub fn world_from_geojson(geojson: GeoJson, origin: &Path) -> Result<World, LoadError> {
    let GeoJson::FeatureCollection(fc) = geojson else {
        return Err(LoadError::NotFeatureCollection {
            path: origin.to_path_buf(),
        });
    };

    let mut countries = Vec::with_capacity(fc.features.len());
    let mut unnamed = 0;

    for feature in fc.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let Some(name) = name else {
            unnamed += 1;
            continue;
        };

        let mut polygons = Vec::new();
        if let Some(ref geometry) = feature.geometry {
            collect_polygons(geometry, &mut polygons);
        }
        if polygons.is_empty() {
            warn!(country = %name, "feature has no polygon geometry");
            continue;
        }
        countries.push(Country::new(name, polygons));
    }

    if unnamed > 0 {
        warn!(path = %origin.display(), unnamed, "features without properties.name were skipped");
    }

    Ok(World::new(countries))
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| DVec2::new(c[0], c[1]))
        .collect()
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let (exterior, holes) = rings.split_first()?;
    Some(Polygon::new(
        to_ring(exterior),
        holes.iter().map(|h| to_ring(h)).collect(),
    ))
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => out.extend(to_polygon(rings)),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| to_polygon(rings)));
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}
