use std::collections::BTreeMap;

use glam::Vec3;

/// Named numeric fields interpolated together by a tween
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<&'static str, f32>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: f32) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_vec3(mut self, keys: [&'static str; 3], value: Vec3) -> Self {
        self.set_vec3(keys, value);
        self
    }

    pub fn set(&mut self, name: &'static str, value: f32) {
        self.fields.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.fields.get(name).copied()
    }

    pub fn set_vec3(&mut self, keys: [&'static str; 3], value: Vec3) {
        self.set(keys[0], value.x);
        self.set(keys[1], value.y);
        self.set(keys[2], value.z);
    }

    /// All three components, or None when any is missing
    pub fn vec3(&self, keys: [&'static str; 3]) -> Option<Vec3> {
        Some(Vec3::new(
            self.get(keys[0])?,
            self.get(keys[1])?,
            self.get(keys[2])?,
        ))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// Fields of `self` moved toward `to` by `t`; fields absent from `to` stay put
    pub fn lerp(&self, to: &Record, t: f32) -> Record {
        let fields = self
            .fields
            .iter()
            .map(|(&name, &from)| {
                let value = match to.get(name) {
                    Some(target) => from + (target - from) * t,
                    None => from,
                };
                (name, value)
            })
            .collect();
        Record { fields }
    }

    /// Euclidean distance over the fields both records share
    pub fn distance(&self, to: &Record) -> f32 {
        self.fields
            .iter()
            .filter_map(|(name, from)| to.get(name).map(|target| (target - from).powi(2)))
            .sum::<f32>()
            .sqrt()
    }

    /// Move at most `step` along the straight line toward `to`
    pub fn step_toward(&self, to: &Record, step: f32) -> Record {
        let distance = self.distance(to);
        if distance <= step || distance == 0.0 {
            return self.lerp(to, 1.0);
        }
        self.lerp(to, step / distance)
    }
}
