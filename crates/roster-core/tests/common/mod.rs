use roster_core::memory::InMemoryBackend;
use roster_core::Project;

/// A stored project with `name`, inserted directly
#[allow(dead_code)]
pub fn stored_project(backend: &mut InMemoryBackend, name: &str) -> Project {
    let mut project = Project::new();
    project.set_name(name);
    backend.insert_project(project)
}

/// Reload a project from the backend, as a fresh edit would see it
#[allow(dead_code)]
pub fn reload(backend: &InMemoryBackend, project: &Project) -> Project {
    use roster_core::ProjectLookup;

    let id = project.id.as_deref().unwrap();
    backend.load_project(id).unwrap().unwrap()
}

#[allow(dead_code)]
pub fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}
