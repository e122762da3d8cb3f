//! End-to-end tests for tile address formatting.

use tianditu::{
    LayerCatalog, LayerType, ParsedTileUrl, TileAddress, TileAddressResolver, Unresolved,
    ONLINE_HOST,
};
use tile_common::{BoundingBox, TileCoord};

const HOST: &str = "http://gis.example.com/";

fn resolver() -> TileAddressResolver {
    TileAddressResolver::new(LayerCatalog::new(HOST))
}

// ============================================================================
// Address properties
// ============================================================================

#[test]
fn test_online_url_carries_shifted_matrix() {
    let resolver = resolver();

    for layer_type in LayerType::ALL.into_iter().filter(|lt| !lt.is_offline()) {
        for z in 0..=16 {
            let url = resolver.tile_address(layer_type, z, 1, 2).unwrap();
            assert!(
                url.ends_with(&format!("&tilematrix={}", z + 2)),
                "{layer_type} z={z}: {url}"
            );
        }
    }
}

#[test]
fn test_out_of_range_is_empty_for_all_layers() {
    let resolver = resolver();

    for layer_type in LayerType::ALL {
        assert!(resolver.tile_address(layer_type, 17, 0, 0).is_none());
        assert!(resolver.tile_address(layer_type, 40, 0, 0).is_none());
    }
}

#[test]
fn test_below_min_zoom_is_empty_online_and_offline() {
    let catalog = LayerCatalog::new(HOST);

    for layer_type in [LayerType::Image2000, LayerType::Image2000Offline] {
        let d = catalog.resolve(layer_type).with_zoom_range(4, 16);
        assert!(matches!(
            TileAddressResolver::address_for(&d, TileCoord::new(3, 0, 0)),
            Err(Unresolved::OutOfRange { .. })
        ));
        assert!(TileAddressResolver::address_for(&d, TileCoord::new(4, 0, 0)).is_ok());
    }
}

#[test]
fn test_resolution_is_idempotent() {
    let resolver = resolver();
    for layer_type in LayerType::ALL {
        let a = resolver.resolve(layer_type, TileCoord::new(9, 200, 431));
        let b = resolver.resolve(layer_type, TileCoord::new(9, 200, 431));
        assert_eq!(a, b);
    }
}

#[test]
fn test_offline_never_reaches_live_host() {
    let resolver = resolver();

    for layer_type in LayerType::ALL.into_iter().filter(|lt| lt.is_offline()) {
        for z in 0..=16 {
            if let Some(addr) = resolver.tile_address(layer_type, z, 5, 5) {
                assert!(!addr.contains(ONLINE_HOST), "{layer_type}: {addr}");
            }
        }
    }
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_image_2000_scenario() {
    assert_eq!(
        resolver().tile_address(LayerType::Image2000, 5, 3, 7).as_deref(),
        Some("http://t0.tianditu.com/img_c/wmts?service=wmts&request=gettile&version=1.0.0&layer=img&format=tiles&tilematrixset=c&tilecol=7&tilerow=3&tilematrix=7")
    );
}

#[test]
fn test_offline_vector_scenario() {
    assert_eq!(
        resolver()
            .tile_address(LayerType::Vector2000Offline, 2, 0, 0)
            .as_deref(),
        Some("http://gis.example.com/Maps/TianDiTu_Vec/metrix4/row0/col0.jpg")
    );
}

#[test]
fn test_image_2000_above_max_zoom_scenario() {
    assert_eq!(resolver().tile_address(LayerType::Image2000, 17, 3, 7), None);
}

#[test]
fn test_english_mercator_vector_annotation_has_layer_code() {
    let url = resolver()
        .tile_address(LayerType::VectorAnnotationEnglishMercator, 3, 1, 1)
        .unwrap();
    assert!(url.starts_with("http://t0.tianditu.com/eva_w/wmts?"));
    assert!(url.contains("&layer=eva&"));
}

// ============================================================================
// Round trips through tiling math and URL parsing
// ============================================================================

#[test]
fn test_locate_then_parse() {
    let resolver = resolver();
    let d = resolver.catalog().resolve(LayerType::ImageAnnotationChinese2000);
    let coord = d.tile_info().tile_at(6, 116.39, 39.91).unwrap();

    let url = match resolver
        .resolve(LayerType::ImageAnnotationChinese2000, coord)
        .unwrap()
    {
        TileAddress::Url(url) => url,
        other => panic!("expected URL, got {other:?}"),
    };

    let parsed = ParsedTileUrl::parse(&url).unwrap();
    assert_eq!(parsed.base, "http://t0.tianditu.com/cia_c/wmts");
    assert_eq!(parsed.request.to_tile_coord().unwrap(), coord);

    let bbox = d.tile_info().tile_bbox(&coord).unwrap();
    assert!(bbox.contains_point(116.39, 39.91));
}

#[test]
fn test_range_over_china() {
    let resolver = resolver();
    let d = resolver.catalog().resolve(LayerType::Vector2000);
    let china = BoundingBox::new(73.5, 18.1, 135.1, 53.6);
    let range = d.tile_info().tile_range(2, &china).unwrap();

    let results = resolver.resolve_range(LayerType::Vector2000, &range);
    assert_eq!(results.len(), range.len());
    assert!(results.iter().all(|(_, r)| r.is_ok()));
}

#[test]
fn test_range_reaching_past_extent_only_addresses_real_rows() {
    let resolver = resolver();
    let d = resolver.catalog().resolve(LayerType::Vector2000);
    let range = d
        .tile_info()
        .tile_range(0, &BoundingBox::new(0.0, -1000.0, 10.0, 10.0))
        .unwrap();
    assert_eq!((range.min_row, range.max_row), (0, 1));

    let results = resolver.resolve_range(LayerType::Vector2000, &range);
    assert_eq!(results.len(), 2);
    for (coord, result) in &results {
        let url = result.as_ref().unwrap().as_str();
        assert!(url.contains(&format!("&tilerow={}&", coord.row)), "{url}");
        assert!(coord.row <= 1);
    }
}

#[test]
fn test_locate_far_outside_extent() {
    let d = resolver().catalog().resolve(LayerType::ImageMercator);
    assert!(d.tile_info().tile_at(0, 1e300, -1e300).is_none());
}

#[test]
fn test_widened_zoom_range_at_u32_limit() {
    let resolver = resolver();
    for layer_type in [LayerType::ImageMercator, LayerType::Image2000Offline] {
        let d = resolver
            .catalog()
            .resolve(layer_type)
            .with_zoom_range(0, u32::MAX);
        let result = TileAddressResolver::address_for(&d, TileCoord::new(u32::MAX, 0, 0));
        assert!(matches!(result, Err(Unresolved::OutOfRange { .. })), "{layer_type}");
    }
}
