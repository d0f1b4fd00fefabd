use clap::Parser;

/// NPC Forge Bot Configuration
#[derive(Parser, Debug, Clone)]
#[clap(
    version = "0.3.2",
    about = "Scheduled fantasy NPC generator and social publishing bot"
)]
pub struct Args {
    /// System prompt
    #[clap(
        long,
        env = "SYSTEM_PROMPT",
        default_value = "You are a creative Dungeons & Dragons NPC generator.",
        help = "System prompt for the character generator"
    )]
    pub system_prompt: String,

    /// Character prompt
    #[clap(
        long,
        env = "CHARACTER_PROMPT",
        default_value = "Generate a creative Dungeons & Dragons NPC with the format:\nName: ...\nRace & Class: ...\nPersonality: ...\nQuirks: ...\nBackstory: ...\nIdeal: ...\nBond: ...\nFlaw: ...",
        help = "User prompt describing the character sheet to generate"
    )]
    pub character_prompt: String,

    /// LLM Host - OpenAI compatible chat completion endpoint host
    #[clap(
        long,
        env = "LLM_HOST",
        default_value = "https://api.openai.com",
        help = "LLM Host - OpenAI compatible chat completion endpoint host"
    )]
    pub llm_host: String,

    /// LLM Model
    #[clap(
        long,
        env = "LLM_MODEL",
        default_value = "gpt-4",
        help = "Model ID for text generation"
    )]
    pub llm_model: String,

    /// Temperature
    #[clap(
        long,
        env = "TEMPERATURE",
        default_value = "0.9",
        help = "Temperature for LLM sampling, 0.0 to 1.0"
    )]
    pub temperature: f32,

    /// Max Tokens
    #[clap(
        long,
        env = "MAX_TOKENS",
        default_value = "800",
        help = "Max tokens for the generated character sheet"
    )]
    pub max_tokens: u32,

    /// OpenAI API Key - used for both text and image generation
    #[clap(long, env = "OPENAI_API_KEY", help = "OpenAI API key")]
    pub openai_api_key: Option<String>,

    /// Image Host
    #[clap(
        long,
        env = "IMAGE_HOST",
        default_value = "https://api.openai.com",
        help = "Image generation endpoint host"
    )]
    pub image_host: String,

    /// Image Model
    #[clap(
        long,
        env = "IMAGE_MODEL",
        default_value = "dall-e-3",
        help = "Model ID for portrait generation"
    )]
    pub image_model: String,

    /// Image Size
    #[clap(
        long,
        env = "IMAGE_SIZE",
        default_value = "1024x1024",
        help = "Portrait size requested from the image endpoint"
    )]
    pub image_size: String,

    /// Skip the portrait step even when an API key is configured
    #[clap(
        long,
        env = "SKIP_IMAGE",
        default_value = "false",
        help = "Skip portrait generation, publish text-only"
    )]
    pub skip_image: bool,

    /// Render a narrated video from the portrait and backstory
    #[clap(
        long,
        env = "VIDEO_ENABLED",
        default_value = "false",
        help = "Render a narrated video from the portrait and backstory"
    )]
    pub video: bool,

    /// Video framerate
    #[clap(
        long,
        env = "VIDEO_FPS",
        default_value = "12",
        help = "Framerate of the rendered video"
    )]
    pub video_fps: u32,

    /// Video encode timeout
    #[clap(
        long,
        env = "VIDEO_TIMEOUT_SECS",
        default_value = "120",
        help = "Seconds to wait for the encoder before killing it"
    )]
    pub video_timeout_secs: u64,

    /// Narration word budget
    #[clap(
        long,
        env = "BACKSTORY_MAX_WORDS",
        default_value = "60",
        help = "Max words of backstory fed to text-to-speech"
    )]
    pub backstory_max_words: usize,

    /// ElevenLabs API Key
    #[clap(long, env = "ELEVENLABS_API_KEY", help = "ElevenLabs API key")]
    pub elevenlabs_api_key: Option<String>,

    /// ElevenLabs Voice ID
    #[clap(
        long,
        env = "ELEVENLABS_VOICE_ID",
        default_value = "Rachel",
        help = "ElevenLabs voice ID"
    )]
    pub elevenlabs_voice_id: String,

    /// ElevenLabs Host
    #[clap(
        long,
        env = "ELEVENLABS_HOST",
        default_value = "https://api.elevenlabs.io",
        help = "ElevenLabs endpoint host"
    )]
    pub elevenlabs_host: String,

    /// Google TTS access token
    #[clap(
        long,
        env = "GOOGLE_TTS_TOKEN",
        help = "Google Cloud TTS bearer token, fallback narration vendor"
    )]
    pub google_tts_token: Option<String>,

    /// Google TTS Host
    #[clap(
        long,
        env = "GOOGLE_TTS_HOST",
        default_value = "https://texttospeech.googleapis.com",
        help = "Google Cloud TTS endpoint host"
    )]
    pub google_tts_host: String,

    /// Narration voice name
    #[clap(
        long,
        env = "TTS_VOICE",
        default_value = "en-GB-Wavenet-B",
        help = "Google TTS voice name"
    )]
    pub tts_voice: String,

    /// Narration language code
    #[clap(
        long,
        env = "TTS_LANGUAGE",
        default_value = "en-GB",
        help = "Google TTS language code"
    )]
    pub tts_language: String,

    /// Narration speaking rate
    #[clap(
        long,
        env = "TTS_SPEAKING_RATE",
        default_value = "0.92",
        help = "Google TTS speaking rate"
    )]
    pub tts_speaking_rate: f32,

    /// Narration pitch
    #[clap(
        long,
        env = "TTS_PITCH",
        default_value = "2.0",
        help = "Google TTS pitch"
    )]
    pub tts_pitch: f32,

    /// Facebook Page ID
    #[clap(long, env = "FB_PAGE_ID", help = "Facebook page ID")]
    pub fb_page_id: Option<String>,

    /// Facebook Page Access Token
    #[clap(
        long,
        env = "FB_PAGE_ACCESS_TOKEN",
        help = "Facebook page access token"
    )]
    pub fb_access_token: Option<String>,

    /// Facebook Graph API host
    #[clap(
        long,
        env = "GRAPH_HOST",
        default_value = "https://graph.facebook.com",
        help = "Facebook Graph API host"
    )]
    pub graph_host: String,

    /// Hashtag suffix appended to every caption
    #[clap(
        long,
        env = "HASHTAGS",
        default_value = "#DnD #DungeonsAndDragons #TabletopRPG #FantasyArt #RPGCharacter #Roleplay #TavernLife #CharacterArt #TTRPG #FantasyWorld #Adventurer",
        help = "Hashtag suffix appended to every caption"
    )]
    pub hashtags: String,

    /// Subscription link appended to the follow-up comment
    #[clap(
        long,
        env = "SUBSCRIBE_LINK",
        help = "Subscription link appended to the follow-up comment"
    )]
    pub subscribe_link: Option<String>,

    /// Google Drive bearer token
    #[clap(
        long,
        env = "GOOGLE_DRIVE_TOKEN",
        help = "Google Drive bearer token for artifact uploads"
    )]
    pub drive_token: Option<String>,

    /// Google Drive folder ID
    #[clap(
        long,
        env = "GOOGLE_DRIVE_FOLDER_ID",
        help = "Google Drive destination folder ID"
    )]
    pub drive_folder_id: Option<String>,

    /// Google Drive API host
    #[clap(
        long,
        env = "DRIVE_HOST",
        default_value = "https://www.googleapis.com",
        help = "Google Drive API host"
    )]
    pub drive_host: String,

    /// Automation webhook URL
    #[clap(
        long,
        env = "WEBHOOK_URL",
        help = "Outbound automation webhook receiving the finished caption"
    )]
    pub webhook_url: Option<String>,

    /// Archive file
    #[clap(
        long,
        env = "ARCHIVE_FILE",
        default_value = "npc_archive.txt",
        help = "Flat-file audit log of generated characters"
    )]
    pub archive_file: String,

    /// Artifact directory
    #[clap(
        long,
        env = "ARTIFACT_DIR",
        default_value = "artifacts",
        help = "Directory holding per-cycle scratch artifacts"
    )]
    pub artifact_dir: String,

    /// Posting schedule
    #[clap(
        long,
        env = "SCHEDULE",
        default_value = "mon@10:00,thu@10:00",
        help = "Posting schedule, comma separated day@HH:MM entries"
    )]
    pub schedule: String,

    /// Scheduler tick
    #[clap(
        long,
        env = "SCHEDULE_TICK_SECS",
        default_value = "30",
        help = "Seconds between schedule polls"
    )]
    pub tick_secs: u64,

    /// HTTP timeout
    #[clap(
        long,
        env = "HTTP_TIMEOUT_SECS",
        default_value = "90",
        help = "Timeout applied to every outbound HTTP call"
    )]
    pub http_timeout_secs: u64,

    /// Bind address for the control panel
    #[clap(
        long,
        env = "BIND_ADDRESS",
        default_value = "0.0.0.0:8080",
        help = "Bind address for the control panel"
    )]
    pub bind_address: String,

    /// Log level
    #[clap(
        long,
        env = "LOGLEVEL",
        default_value = "info",
        help = "Log level, error, warn, info, debug or trace"
    )]
    pub loglevel: String,
}
