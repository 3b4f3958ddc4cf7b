#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tutorial {
    pub id: &'static str,
    pub title: &'static str,
    pub topic: &'static str,
    pub summary: &'static str,
    pub steps: &'static [&'static str],
}

pub const TUTORIALS: &[Tutorial] = &[
    Tutorial {
        id: "first-project",
        title: "Your first project",
        topic: "getting-started",
        summary: "Create a project from an industry template and open it in the studio.",
        steps: &[
            "Open the projects page and choose Create",
            "Pick an industry and, optionally, a template",
            "Open the new project in the design studio",
        ],
    },
    Tutorial {
        id: "design-commands",
        title: "Designing with commands",
        topic: "design-studio",
        summary: "Change color, material, finish and size by typing short commands.",
        steps: &[
            "Type a color, for example \"make it blue\"",
            "Add a material such as wood, metal, plastic or glass",
            "Ask for a glossy or matte finish",
            "Say \"larger\" or \"smaller\" to resize, then save",
        ],
    },
    Tutorial {
        id: "reference-images",
        title: "Working from a reference image",
        topic: "design-studio",
        summary: "Attach a photo or sketch to a project as its reference image.",
        steps: &["Open a project in the studio", "Upload a PNG or JPEG file", "The image is linked to the project"],
    },
    Tutorial {
        id: "sustainable-materials",
        title: "Choosing sustainable materials",
        topic: "materials",
        summary: "Filter the material library by category and sustainability score.",
        steps: &[
            "Open the material library",
            "Filter by category",
            "Enable sustainable only and set a minimum score",
        ],
    },
    Tutorial {
        id: "standards",
        title: "Checking industry standards",
        topic: "standards",
        summary: "Browse the standards that apply to your industry.",
        steps: &["Open the standards page", "Select your industry", "Open a standard to read its key requirements"],
    },
    Tutorial {
        id: "team-sessions",
        title: "Collaborating with your team",
        topic: "collaboration",
        summary: "Start a collaboration session on a project.",
        steps: &["Open the collaboration page for a project", "Name the session or keep the default", "Share the session id"],
    },
    Tutorial {
        id: "exporting",
        title: "Exporting a design",
        topic: "export",
        summary: "Export a project as JSON, CSV, a PDF document structure or a DXF drawing.",
        steps: &["Open the export page", "Choose a format", "Save the exported file"],
    },
];

#[derive(Debug, Default)]
pub struct TutorialsPage {
    pub topic: Option<String>,
    pub selected: Option<&'static Tutorial>,
}

impl TutorialsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topics() -> Vec<&'static str> {
        let mut topics: Vec<&'static str> = Vec::new();
        for tutorial in TUTORIALS {
            if !topics.contains(&tutorial.topic) {
                topics.push(tutorial.topic);
            }
        }
        topics
    }

    pub fn set_topic(&mut self, topic: Option<&str>) {
        self.topic = topic.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        self.selected = None;
    }

    pub fn visible(&self) -> Vec<&'static Tutorial> {
        TUTORIALS
            .iter()
            .filter(|t| self.topic.as_deref().map_or(true, |topic| t.topic == topic))
            .collect()
    }

    pub fn select(&mut self, id: &str) -> Option<&'static Tutorial> {
        self.selected = TUTORIALS.iter().find(|t| t.id == id);
        self.selected
    }
}
