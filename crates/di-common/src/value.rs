//! 动态值模型
//!
//! 容器中流转的所有值都是 [`Instance`]，身份比较使用 `Arc::ptr_eq`。

use crate::errors::{DependencyError, DependencyResult};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// 容器中的值
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 将具体值装箱为 [`Instance`]
pub fn instance<T: Any + Send + Sync>(value: T) -> Instance {
    Arc::new(value)
}

/// 将 [`Instance`] 还原为具体类型
pub fn downcast<T: Any + Send + Sync>(
    value: Instance,
    type_name_hint: &str,
) -> DependencyResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DependencyError::InstanceTypeMismatch {
            type_name: type_name_hint.to_string(),
            expected: type_name::<T>().to_string(),
        })
}

/// 参数覆盖表
///
/// 键为参数名或参数声明类型名。保持插入顺序，每个条目至多被一个参数消费。
#[derive(Clone, Default)]
pub struct Overrides {
    entries: Vec<(String, Instance)>,
}

impl Overrides {
    /// 创建空的覆盖表
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个具体值
    pub fn with<T: Any + Send + Sync>(self, key: impl Into<String>, value: T) -> Self {
        self.with_instance(key, Arc::new(value))
    }

    /// 添加一个已装箱的值（保持其身份）
    pub fn with_instance(mut self, key: impl Into<String>, value: Instance) -> Self {
        self.insert(key, value);
        self
    }

    /// 插入条目；键已存在时原位替换
    pub fn insert(&mut self, key: impl Into<String>, value: Instance) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// 取出并移除指定键的值
    pub fn take(&mut self, key: &str) -> Option<Instance> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 剩余的键，按插入顺序
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// 按插入顺序消费剩余的值
    pub fn into_values(self) -> impl Iterator<Item = Instance> {
        self.entries.into_iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>> FromIterator<(K, Instance)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, Instance)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (key, value) in iter {
            overrides.insert(key, value);
        }
        overrides
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// 传给构造函数、方法和闭包体的位置参数
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Instance>,
}

impl Arguments {
    pub fn new(values: Vec<Instance>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 原始值
    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.values.get(index)
    }

    /// 按类型取第 `index` 个参数
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DependencyResult<Arc<T>> {
        let value = self
            .values
            .get(index)
            .ok_or(DependencyError::ArgumentMissing { index })?;
        Arc::clone(value)
            .downcast::<T>()
            .map_err(|_| DependencyError::ArgumentTypeMismatch {
                index,
                expected: type_name::<T>().to_string(),
            })
    }

    /// 按类型取第 `index` 个参数的副本
    pub fn value<T: Any + Send + Sync + Clone>(&self, index: usize) -> DependencyResult<T> {
        self.get::<T>(index).map(|v| (*v).clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.values.iter()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("len", &self.values.len())
            .finish()
    }
}
