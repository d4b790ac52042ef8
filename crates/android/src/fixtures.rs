//! Shared test inputs

/// Declaration of the neuroverse chatbot app module
pub(crate) const CHATBOT_DECLARATION: &str = r#"
plugins = [
    "com.android.application",
    "kotlin-android",
    "dev.flutter.flutter-gradle-plugin",
    "com.google.gms.google-services",
]

[android]
namespace = "com.example.neuroverse_chatbot"
ndk_version = "27.0.12077973"

[android.compile_options]
source_compatibility = "VERSION_11"
target_compatibility = "VERSION_11"

[android.kotlin_options]
jvm_target = "VERSION_11"

[android.default_config]
application_id = "com.example.neuroverse_chatbot"
min_sdk = 23

[android.build_types.release]
signing_config = "debug"

[flutter]
source = "../.."
"#;

/// `local.properties` as written by `flutter pub get`
pub(crate) const CHATBOT_LOCAL_PROPERTIES: &str = "sdk.dir=/home/dev/Android/Sdk
flutter.sdk=/home/dev/flutter
flutter.buildMode=debug
flutter.versionName=1.0.0
flutter.versionCode=1
";
