//! Service catalog types

use serde::{Deserialize, Serialize};

/// A tracked external service.
///
/// `name` is the stable identifier used by plan assignments and usage
/// records; `url` and `category` are display metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub url: String,
    pub category: String,
}

impl ServiceDescriptor {
    pub fn new(name: &str, url: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
        }
    }
}

/// Immutable catalog of known services, built at startup.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
}

impl ServiceRegistry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Self {
        Self { services }
    }

    /// The built-in catalog of tracked SaaS tools.
    pub fn builtin() -> Self {
        let svc = ServiceDescriptor::new;
        Self::new(vec![
            svc("ChatGPT", "https://chat.openai.com/", "Conversational AI"),
            svc("Claude", "https://www.anthropic.com/", "Conversational AI"),
            svc("GPT-Engineer", "https://gptengineer.app/", "AI Development"),
            svc("v0", "https://v0.dev/", "AI Development"),
            svc("Cosor", "https://www.cosor.com.tw/", "AI Development"),
            svc("create", "https://www.create.xyz/", "AI Development"),
            svc("Dify", "https://dify.ai/", "Backend Services"),
            svc("Supabase", "https://supabase.com/", "Backend Services"),
            svc(
                "Google Cloud Console",
                "https://console.cloud.google.com/",
                "Cloud Services",
            ),
            svc("Twitter", "https://twitter.com", "Launch Services"),
            svc("Facebook", "https://facebook.com", "Launch Services"),
            svc("LinkedIn", "https://linkedin.com", "Launch Services"),
            svc("PR Times", "https://prtimes.jp", "Launch Services"),
            svc(
                "Product Hunt",
                "https://www.producthunt.com",
                "Launch Services",
            ),
            svc("Note", "https://note.com", "Launch Services"),
            svc("Udemy", "https://www.udemy.com/", "Launch Services"),
            svc("GenSpark", "https://www.genspark.ai/", "Search"),
            svc("Felo", "https://felo.ai/ja/search", "Search"),
            svc("Perplexity", "https://www.perplexity.ai/", "Search"),
        ])
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// Find a service by name
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Group services by category, categories in first-seen order and
    /// services in registry order within each group.
    pub fn by_category(&self) -> Vec<(&str, Vec<&ServiceDescriptor>)> {
        let mut groups: Vec<(&str, Vec<&ServiceDescriptor>)> = Vec::new();
        for service in &self.services {
            match groups.iter_mut().find(|(c, _)| *c == service.category) {
                Some((_, members)) => members.push(service),
                None => groups.push((service.category.as_str(), vec![service])),
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
