use serde::Serialize;

/// Host-provided defaults for one platform family.
///
/// `provided` entries are `(group, artifact)` pairs in the same notation as
/// descriptor declarations; `.*` selects every artifact of a group.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub include_transitive: bool,
    pub provided: &'static [(&'static str, &'static str)],
}

const GSON: (&str, &str) = ("com.google.code.gson", "gson");
const GUAVA: (&str, &str) = ("com.google.guava", "guava");
const NETTY: (&str, &str) = ("io.netty", ".*");
const SNAKEYAML: (&str, &str) = ("org.yaml", "snakeyaml");
const SLF4J: (&str, &str) = ("org.slf4j", "slf4j-api");
const LOG4J: (&str, &str) = ("org.apache.logging.log4j", ".*");
const FASTUTIL: (&str, &str) = ("it.unimi.dsi", "fastutil");

pub const BUILTIN_PRESETS: &[Preset] = &[
    Preset {
        name: "bungeecord",
        description: "BungeeCord proxy plugin; host ships Netty, Gson, Guava and SnakeYAML",
        include_transitive: false,
        provided: &[NETTY, GSON, GUAVA, SNAKEYAML],
    },
    Preset {
        name: "fabric",
        description: "Fabric mod; transitive dependencies are nested jar-in-jar",
        include_transitive: true,
        provided: &[
            NETTY,
            GSON,
            GUAVA,
            SLF4J,
            LOG4J,
            FASTUTIL,
            ("com.mojang", ".*"),
            ("net.fabricmc", ".*"),
        ],
    },
    Preset {
        name: "forge",
        description: "Forge mod; transitive dependencies are nested jar-in-jar",
        include_transitive: true,
        provided: &[
            NETTY,
            GSON,
            GUAVA,
            SLF4J,
            LOG4J,
            FASTUTIL,
            ("com.mojang", ".*"),
            ("net.minecraftforge", ".*"),
        ],
    },
    Preset {
        name: "neoforge",
        description: "NeoForge mod; transitive dependencies are nested jar-in-jar",
        include_transitive: true,
        provided: &[
            NETTY,
            GSON,
            GUAVA,
            SLF4J,
            LOG4J,
            FASTUTIL,
            ("com.mojang", ".*"),
            ("net.neoforged", ".*"),
        ],
    },
    Preset {
        name: "spigot",
        description: "Spigot/Paper plugin; host ships Netty, Gson, Guava and SnakeYAML",
        include_transitive: false,
        provided: &[NETTY, GSON, GUAVA, SNAKEYAML, FASTUTIL],
    },
    Preset {
        name: "standalone",
        description: "Self-contained application; nothing is provided by a host",
        include_transitive: true,
        provided: &[],
    },
    Preset {
        name: "velocity",
        description: "Velocity proxy plugin; host ships Netty, Adventure, Gson, Guava and SLF4J",
        include_transitive: false,
        provided: &[
            NETTY,
            GSON,
            GUAVA,
            SLF4J,
            LOG4J,
            ("net.kyori", "adventure-.*"),
            ("com.velocitypowered", ".*"),
        ],
    },
];

pub fn get_preset(name: &str) -> Option<&'static Preset> {
    BUILTIN_PRESETS.iter().find(|p| p.name == name)
}

pub fn list_presets() -> &'static [Preset] {
    BUILTIN_PRESETS
}
