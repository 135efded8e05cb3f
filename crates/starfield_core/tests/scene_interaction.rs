use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starfield_core::{
    CategoryAnchor, CategoryError, CategoryInfo, ConfigError, DragResolution, FieldConfig,
    PointerEvent, Rgb, SceneError, ScreenPoint, StarEmphasis, Starfield, StarfieldConfig,
};
use uuid::Uuid;

fn small_config() -> StarfieldConfig {
    StarfieldConfig {
        field: FieldConfig {
            particle_count: 600,
            background_star_count: 50,
            ..FieldConfig::default()
        },
        ..StarfieldConfig::default()
    }
}

fn categories() -> Vec<CategoryInfo> {
    vec![
        CategoryInfo::with_id("a", "A", Rgb::from_u8(0xee, 0x66, 0x33)).unwrap(),
        CategoryInfo::with_id("b", "B", Rgb::from_u8(0x33, 0x99, 0xee)).unwrap(),
    ]
}

fn anchors() -> Vec<CategoryAnchor> {
    vec![
        CategoryAnchor {
            category: "a".to_string(),
            position: ScreenPoint::new(100.0, 600.0),
        },
        CategoryAnchor {
            category: "b".to_string(),
            position: ScreenPoint::new(700.0, 600.0),
        },
    ]
}

fn scene() -> Starfield<ChaCha8Rng> {
    Starfield::with_rngs(
        small_config(),
        categories(),
        ChaCha8Rng::seed_from_u64(7),
        ChaCha8Rng::seed_from_u64(11),
    )
    .unwrap()
}

#[test]
fn dragging_one_fragment_promotes_only_that_fragment() {
    let mut scene = scene();
    let entry_id = Uuid::new_v4();
    let x = scene.create_pending("x", "a".to_string(), entry_id);
    let y = scene.create_pending("y", "a".to_string(), entry_id);
    let anchors = anchors();

    scene.handle_pointer(
        PointerEvent::DragStart {
            fragment: x.id,
            at: ScreenPoint::new(400.0, 300.0),
        },
        &anchors,
    );
    scene.handle_pointer(
        PointerEvent::DragMove {
            at: ScreenPoint::new(680.0, 590.0),
        },
        &anchors,
    );
    assert_eq!(scene.interaction().drag_target(), Some("b"));

    let resolution = scene.handle_pointer(
        PointerEvent::DragEnd {
            at: ScreenPoint::new(690.0, 595.0),
        },
        &anchors,
    );
    let Some(DragResolution::Promoted(star)) = resolution else {
        panic!("expected promotion, got {resolution:?}");
    };

    assert_eq!(star.category, "b");
    assert_eq!(star.content, "x");
    assert_eq!(star.color, categories()[1].color);
    assert_eq!(scene.stars().len(), 1);
    assert_eq!(scene.pending().len(), 1);
    assert_eq!(scene.pending()[0].id, y.id);
    assert!(scene.interaction().drag().is_none());
}

#[test]
fn release_out_of_range_snaps_back_and_changes_nothing() {
    let mut scene = scene();
    let fragment = scene.create_pending("far away", "a".to_string(), Uuid::new_v4());
    let anchors = anchors();
    let origin = ScreenPoint::new(400.0, 300.0);

    scene.handle_pointer(
        PointerEvent::DragStart {
            fragment: fragment.id,
            at: origin,
        },
        &anchors,
    );
    // Passes close to B, then leaves its radius before release.
    scene.handle_pointer(
        PointerEvent::DragMove {
            at: ScreenPoint::new(700.0, 560.0),
        },
        &anchors,
    );
    let resolution = scene.handle_pointer(
        PointerEvent::DragEnd {
            at: ScreenPoint::new(400.0, 100.0),
        },
        &anchors,
    );

    assert_eq!(
        resolution,
        Some(DragResolution::SnappedBack {
            fragment: fragment.id,
            origin,
        })
    );
    assert!(scene.stars().is_empty());
    assert_eq!(scene.pending().len(), 1);
}

#[test]
fn drop_on_unknown_anchor_category_snaps_back() {
    let mut scene = scene();
    let fragment = scene.create_pending("orphan", "a".to_string(), Uuid::new_v4());
    let anchors = vec![CategoryAnchor {
        category: "missing".to_string(),
        position: ScreenPoint::new(10.0, 10.0),
    }];

    scene.handle_pointer(
        PointerEvent::DragStart {
            fragment: fragment.id,
            at: ScreenPoint::new(200.0, 200.0),
        },
        &anchors,
    );
    let resolution = scene.handle_pointer(
        PointerEvent::DragEnd {
            at: ScreenPoint::new(12.0, 12.0),
        },
        &anchors,
    );

    assert!(matches!(
        resolution,
        Some(DragResolution::SnappedBack { fragment: id, .. }) if id == fragment.id
    ));
    assert!(scene.stars().is_empty());
    assert_eq!(scene.pending().len(), 1);
}

#[test]
fn category_click_twice_restores_unfocused_state() {
    let mut scene = scene();
    let anchors = anchors();

    scene.handle_pointer(PointerEvent::CategoryClick("a".to_string()), &anchors);
    assert_eq!(scene.interaction().active_category(), Some("a"));
    scene.handle_pointer(PointerEvent::CategoryClick("a".to_string()), &anchors);
    assert_eq!(scene.interaction().active_category(), None);

    scene.handle_pointer(PointerEvent::CategoryClick("a".to_string()), &anchors);
    scene.handle_pointer(PointerEvent::CategoryClick("b".to_string()), &anchors);
    assert_eq!(scene.interaction().active_category(), Some("b"));
    scene.handle_pointer(PointerEvent::EmptyClick, &anchors);
    assert_eq!(scene.interaction().active_category(), None);
}

#[test]
fn removing_hovered_star_clears_hover() {
    let mut scene = scene();
    let pending = scene.create_pending("glow", "a".to_string(), Uuid::new_v4());
    let star = scene.promote(pending.id, "a").unwrap();

    scene.handle_pointer(PointerEvent::StarEnter(star.id), &[]);
    assert_eq!(scene.interaction().hovered_star(), Some(star.id));

    assert!(scene.remove_star(star.id).is_some());
    assert_eq!(scene.interaction().hovered_star(), None);
    assert!(scene.remove_star(star.id).is_none());

    let params = scene.frame(1.0, 0.016);
    assert!(params.stars.is_empty());
}

#[test]
fn focus_dims_gradually_and_draws_constellation() {
    let mut scene = scene();
    let entry_id = Uuid::new_v4();
    for text in ["one", "two", "three"] {
        let pending = scene.create_pending(text, "a".to_string(), entry_id);
        scene.promote(pending.id, "a").unwrap();
    }
    let pending = scene.create_pending("other", "b".to_string(), entry_id);
    let outsider = scene.promote(pending.id, "b").unwrap();

    let idle = scene.frame(0.0, 0.016);
    assert_eq!(idle.uniforms.dim_factor, 1.0);
    assert!(idle.constellation.is_none());

    scene.handle_pointer(PointerEvent::CategoryClick("a".to_string()), &[]);
    let first = scene.frame(0.016, 0.016);
    let dim = first.uniforms.dim_factor;
    assert!(dim > 0.2 && dim < 1.0, "dim {dim} should be strictly between");

    let constellation = first.constellation.expect("focused category with stars");
    assert_eq!(constellation.category, "a");
    assert_eq!(constellation.lines.len(), 2);
    assert!(constellation
        .lines
        .iter()
        .all(|line| line.from != outsider.id && line.to != outsider.id));

    let selected = first
        .stars
        .iter()
        .filter(|visual| visual.emphasis == StarEmphasis::Selected)
        .count();
    assert_eq!(selected, 3);

    let mut previous = dim;
    for step in 2..200 {
        let params = scene.frame(step as f32 * 0.016, 0.016);
        assert!(params.uniforms.dim_factor <= previous);
        previous = params.uniforms.dim_factor;
    }
    assert!((previous - 0.2).abs() < 0.01);
}

#[test]
fn adding_a_category_swaps_the_field() {
    let mut scene = scene();
    let before = scene.field();

    scene
        .add_category(CategoryInfo::with_id("c", "C", Rgb::from_u8(0, 200, 100)).unwrap())
        .unwrap();
    let after = scene.field();

    assert_eq!(scene.categories().len(), 3);
    assert_eq!(before.len(), after.len());
    assert_ne!(before.colors(), after.colors());
}

#[test]
fn rename_keeps_field_and_star_colors() {
    let mut scene = scene();
    let pending = scene.create_pending("kept", "a".to_string(), Uuid::new_v4());
    let star = scene.promote(pending.id, "a").unwrap();
    let field = scene.field();

    scene.rename_category("a", "Renamed").unwrap();

    assert_eq!(scene.categories()[0].name, "Renamed");
    assert_eq!(scene.stars()[0].color, star.color);
    assert!(std::sync::Arc::ptr_eq(&field, &scene.field()));
    assert!(scene.rename_category("zzz", "x").is_err());
}

#[test]
fn discarding_dragged_fragment_cancels_the_drag() {
    let mut scene = scene();
    let entry_id = Uuid::new_v4();
    let fragment = scene.create_pending("let go", "a".to_string(), entry_id);
    let kept = scene.create_pending("keep", "a".to_string(), entry_id);
    let anchors = anchors();

    scene.handle_pointer(
        PointerEvent::DragStart {
            fragment: fragment.id,
            at: ScreenPoint::new(300.0, 300.0),
        },
        &anchors,
    );
    assert_eq!(scene.discard_pending(fragment.id), Some(fragment.clone()));
    assert!(scene.interaction().drag().is_none());
    assert!(scene.discard_pending(fragment.id).is_none());

    let resolution = scene.handle_pointer(
        PointerEvent::DragEnd {
            at: ScreenPoint::new(700.0, 600.0),
        },
        &anchors,
    );
    assert!(resolution.is_none());
    assert!(scene.stars().is_empty());
    assert_eq!(scene.pending(), &[kept]);
}

#[test]
fn repeated_category_id_is_refused_without_regenerating() {
    let mut scene = scene();
    let field = scene.field();

    let err = scene
        .add_category(CategoryInfo::with_id("b", "Other B", Rgb::WHITE).unwrap())
        .unwrap_err();
    assert!(matches!(err, CategoryError::DuplicateId(ref id) if id == "b"));
    assert_eq!(scene.categories(), categories().as_slice());
    assert!(std::sync::Arc::ptr_eq(&field, &scene.field()));

    let mut doubled = categories();
    doubled.push(categories()[0].clone());
    assert!(scene.set_categories(doubled).is_err());
    assert_eq!(scene.categories().len(), 2);

    scene.set_categories(categories()[..1].to_vec()).unwrap();
    assert_eq!(scene.categories().len(), 1);
}

#[test]
fn construction_validates_config_and_category_ids() {
    let mut reversed = small_config();
    reversed.spawn.min_size = 4.0;
    reversed.spawn.max_size = 2.0;
    let result = Starfield::with_rngs(
        reversed,
        categories(),
        ChaCha8Rng::seed_from_u64(7),
        ChaCha8Rng::seed_from_u64(11),
    );
    assert!(matches!(
        result,
        Err(SceneError::Config(ConfigError::Invalid(_)))
    ));

    let mut doubled = categories();
    doubled.push(categories()[1].clone());
    let result = Starfield::with_rngs(
        small_config(),
        doubled,
        ChaCha8Rng::seed_from_u64(7),
        ChaCha8Rng::seed_from_u64(11),
    );
    assert!(matches!(
        result,
        Err(SceneError::Category(CategoryError::DuplicateId(_)))
    ));
}
