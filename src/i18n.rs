use std::collections::HashMap;

pub type Translations = HashMap<String, String>;

/// Language used when the configured one has no translation table.
pub const FALLBACK_LANGUAGE: &str = "en";

/// A language the built-in UI strings are available in.
#[derive(Debug, Clone, Copy)]
pub struct Language {
    pub code: &'static str,
}

pub fn supported_languages() -> &'static [Language] {
    &[Language { code: "en" }, Language { code: "es" }]
}

/// Get UI strings for `code`, falling back to English.
pub fn translations(code: &str) -> Translations {
    let table = match code {
        "es" => translations_es(),
        "en" => translations_en(),
        other => {
            tracing::warn!(
                language = other,
                fallback = FALLBACK_LANGUAGE,
                supported = ?supported_languages().iter().map(|l| l.code).collect::<Vec<_>>(),
                "unsupported language, falling back"
            );
            translations_en()
        }
    };

    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn translations_en() -> &'static [(&'static str, &'static str)] {
    &[
        // Navigation
        ("nav.projects", "Projects"),
        ("nav.skills", "Skills"),
        ("nav.experience", "Experience"),
        ("nav.menu", "Menu"),
        // Sections
        ("section.projects", "Featured projects"),
        ("section.skills", "Skills"),
        ("section.experience", "Creative experience"),
        // Hero
        ("hero.contact", "Contact me"),
        ("hero.download_cv", "Download CV (PDF)"),
        ("hero.whatsapp", "WhatsApp"),
        ("field.phone", "Phone"),
        ("field.email", "Email"),
        // Carousel
        ("carousel.previous", "Previous"),
        ("carousel.next", "Next"),
        ("carousel.go_to", "Go to slide"),
        ("carousel.view_project", "View project"),
        // Theme
        ("theme.light", "Light"),
        ("theme.dark", "Dark"),
        ("theme.toggle", "Toggle theme"),
        // Project page
        ("project.back", "← Back"),
        ("project.back_home", "← Back to home"),
        ("project.not_found", "Project not found"),
        ("project.objective", "Objective"),
        ("project.solution", "Solution"),
        ("project.result", "Result"),
        ("project.gallery", "Gallery"),
        ("project.image", "Image"),
        ("project.external", "Open external project link"),
        // Footer
        ("footer.made_in", "Made with ♥ in"),
    ]
}

fn translations_es() -> &'static [(&'static str, &'static str)] {
    &[
        // Navigation
        ("nav.projects", "Proyectos"),
        ("nav.skills", "Habilidades"),
        ("nav.experience", "Experiencia"),
        ("nav.menu", "Menú"),
        // Sections
        ("section.projects", "Proyectos Destacados"),
        ("section.skills", "Habilidades"),
        ("section.experience", "Experiencia Creativa"),
        // Hero
        ("hero.contact", "Contáctame"),
        ("hero.download_cv", "Descargar CV (PDF)"),
        ("hero.whatsapp", "WhatsApp"),
        ("field.phone", "Tel"),
        ("field.email", "Email"),
        // Carousel
        ("carousel.previous", "Anterior"),
        ("carousel.next", "Siguiente"),
        ("carousel.go_to", "Ir al slide"),
        ("carousel.view_project", "Ver proyecto"),
        // Theme
        ("theme.light", "Claro"),
        ("theme.dark", "Oscuro"),
        ("theme.toggle", "Cambiar tema"),
        // Project page
        ("project.back", "← Volver"),
        ("project.back_home", "← Volver al inicio"),
        ("project.not_found", "Proyecto no encontrado"),
        ("project.objective", "Objetivo"),
        ("project.solution", "Solución"),
        ("project.result", "Resultado"),
        ("project.gallery", "Galería"),
        ("project.image", "Imagen"),
        ("project.external", "Ver enlace del proyecto externo"),
        // Footer
        ("footer.made_in", "Hecho con ♥ en"),
    ]
}
