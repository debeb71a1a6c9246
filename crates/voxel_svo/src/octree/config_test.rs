use super::*;

#[test]
fn test_default_is_air_unbounded() {
  let config = SvoConfig::default();
  assert_eq!(config.default_voxel, VoxelType::AIR);
  assert_eq!(config.max_depth, None);
  assert_eq!(config.ray.max_distance, DEFAULT_MAX_RAY_DISTANCE);
  assert!(config.validate().is_ok());
}

#[test]
fn test_builder() {
  let config = SvoConfig::new(3).with_max_depth(4);
  assert_eq!(config.default_voxel, VoxelType(3));
  assert_eq!(config.max_depth, Some(4));
}

#[test]
fn test_check_depth() {
  let config = SvoConfig::default().with_max_depth(2);
  assert!(config.check_depth(0).is_ok());
  assert!(config.check_depth(2).is_ok());
  match config.check_depth(3) {
    Err(SvoError::IndexTooDeep { depth, max_depth }) => {
      assert_eq!(depth, 3);
      assert_eq!(max_depth, 2);
    }
    other => panic!("Expected IndexTooDeep, got {:?}", other),
  }

  // Unbounded accepts anything
  assert!(SvoConfig::default().check_depth(1000).is_ok());
}

#[test]
fn test_validate_rejects_bad_ray_settings() {
  let config = SvoConfig::default().with_ray(RayConfig {
    max_distance: 0.0,
    ..RayConfig::default()
  });
  assert!(matches!(config.validate(), Err(SvoError::InvalidConfig(_))));

  let config = SvoConfig::default().with_ray(RayConfig {
    max_distance: f32::NAN,
    ..RayConfig::default()
  });
  assert!(config.validate().is_err());

  let config = SvoConfig::default().with_ray(RayConfig {
    parallel_epsilon: -1.0,
    ..RayConfig::default()
  });
  assert!(config.validate().is_err());
}
