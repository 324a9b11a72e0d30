use super::ISettingRepo;
use reelminder_domain::{Setting, SettingKey};
use std::collections::HashMap;

pub struct InMemorySettingRepo {
    settings: std::sync::Mutex<HashMap<String, Setting>>,
}

impl InMemorySettingRepo {
    pub fn new() -> Self {
        Self {
            settings: std::sync::Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISettingRepo for InMemorySettingRepo {
    async fn get(&self, key: SettingKey) -> anyhow::Result<Option<Setting>> {
        let settings = self.settings.lock().unwrap();
        Ok(settings.get(key.as_str()).cloned())
    }

    async fn set(&self, setting: &Setting) -> anyhow::Result<()> {
        let mut settings = self.settings.lock().unwrap();
        settings.insert(setting.key.clone(), setting.clone());
        Ok(())
    }

    async fn insert_if_absent(&self, setting: &Setting) -> anyhow::Result<bool> {
        let mut settings = self.settings.lock().unwrap();
        if settings.contains_key(&setting.key) {
            return Ok(false);
        }
        settings.insert(setting.key.clone(), setting.clone());
        Ok(true)
    }
}
