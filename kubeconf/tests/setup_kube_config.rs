use std::fs;
use std::path::Path;

use kubeconf::{
    read_config_or_new, setup_kube_config, write_config, ClusterSpec, ContextSpec, Error,
    KubeConfig, KubeConfigSetup, NamedExtension, UserSpec,
};

const LA_CROIX: &str = r#"
apiVersion: v1
clusters:
- cluster:
    certificate-authority: /home/la-croix/apiserver.crt
    server: 192.168.1.1:8080
  name: la-croix
contexts:
- context:
    cluster: la-croix
    user: la-croix
  name: la-croix
current-context: la-croix
kind: Config
preferences: {}
users:
- name: la-croix
  user:
    client-certificate: /home/la-croix/apiserver.crt
    client-key: /home/la-croix/apiserver.key
"#;

fn test_setup(path: &Path, keep_context: bool) -> KubeConfigSetup {
    KubeConfigSetup {
        kube_config_file: path.to_owned(),
        cluster_name: "test".into(),
        cluster_server_address: "192.168.1.1:8080".into(),
        client_certificate: Some("/home/apiserver.crt".into()),
        client_key: Some("/home/apiserver.key".into()),
        certificate_authority: Some("/home/apiserver.crt".into()),
        keep_context,
        embed_certs: false,
    }
}

#[test]
fn new_kube_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kubeconfig");

    setup_kube_config(&test_setup(&path, false)).unwrap();

    let kc = read_config_or_new(&path).unwrap();
    assert_eq!(kc.clusters.len(), 1);
    assert_eq!(kc.users.len(), 1);
    assert_eq!(kc.contexts.len(), 1);
    assert_eq!(kc.current_context, "test");

    let cluster = &kc.clusters["test"];
    assert_eq!(cluster.server, "192.168.1.1:8080");
    assert_eq!(
        cluster.certificate_authority.as_deref(),
        Some(Path::new("/home/apiserver.crt"))
    );

    let user = &kc.users["test"];
    assert_eq!(
        user.client_certificate.as_deref(),
        Some(Path::new("/home/apiserver.crt"))
    );
    assert_eq!(
        user.client_key.as_deref(),
        Some(Path::new("/home/apiserver.key"))
    );

    assert_eq!(kc.contexts["test"], ContextSpec::new("test", "test"));
}

#[test]
fn empty_file_switches_even_when_keeping_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kubeconfig");
    fs::write(&path, "").unwrap();

    setup_kube_config(&test_setup(&path, true)).unwrap();

    let kc = read_config_or_new(&path).unwrap();
    assert_eq!(kc.current_context, "test");
}

#[test]
fn add_to_kube_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kubeconfig");
    fs::write(&path, LA_CROIX).unwrap();
    let before = read_config_or_new(&path).unwrap();

    setup_kube_config(&test_setup(&path, false)).unwrap();

    let kc = read_config_or_new(&path).unwrap();
    assert_eq!(kc.current_context, "test");
    assert_eq!(kc.clusters.len(), 2);
    assert_eq!(kc.clusters["la-croix"], before.clusters["la-croix"]);
    assert_eq!(kc.users["la-croix"], before.users["la-croix"]);
    assert_eq!(kc.contexts["la-croix"], before.contexts["la-croix"]);
}

#[test]
fn keep_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kubeconfig");
    fs::write(&path, LA_CROIX).unwrap();

    let setup = test_setup(&path, true);
    setup_kube_config(&setup).unwrap();
    setup_kube_config(&setup).unwrap();

    let kc = read_config_or_new(&path).unwrap();
    assert_eq!(kc.current_context, "la-croix");
    assert!(kc.contexts.contains_key("test"));
}

#[test]
fn repeated_setup_overwrites_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kubeconfig");

    setup_kube_config(&test_setup(&path, false)).unwrap();
    setup_kube_config(&KubeConfigSetup {
        cluster_server_address: "192.168.1.2:8443".into(),
        certificate_authority: None,
        ..test_setup(&path, false)
    })
    .unwrap();

    let kc = read_config_or_new(&path).unwrap();
    assert_eq!(kc.clusters.len(), 1);
    assert_eq!(kc.clusters["test"].server, "192.168.1.2:8443");
    assert_eq!(kc.clusters["test"].certificate_authority, None);
}

#[test]
fn untouched_fields_survive_merge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kubeconfig");
    fs::write(
        &path,
        r#"
apiVersion: v1
kind: Config
clusters:
- name: eks
  cluster:
    server: https://eks.example.com
    certificate-authority-data: Q0EK
    tls-server-name: eks.internal
    extensions:
    - name: client.authentication.k8s.io/exec
      extension:
        audience: sts
contexts:
- name: eks
  context:
    cluster: eks
    user: eks
    namespace: payments
current-context: eks
preferences:
  colors: true
users:
- name: eks
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: aws
      args: [eks, get-token, --cluster-name, prod]
extensions:
- name: owner
  extension:
    team: platform
"#,
    )
    .unwrap();
    let before = read_config_or_new(&path).unwrap();

    setup_kube_config(&test_setup(&path, true)).unwrap();

    let after = read_config_or_new(&path).unwrap();
    assert_eq!(after.current_context, "eks");
    assert_eq!(after.preferences, before.preferences);
    assert_eq!(after.extensions, before.extensions);
    assert_eq!(after.clusters["eks"], before.clusters["eks"]);
    assert_eq!(after.users["eks"], before.users["eks"]);
    assert_eq!(after.contexts["eks"], before.contexts["eks"]);
    assert!(after.clusters["eks"].other.contains_key("tls-server-name"));
    assert!(after.users["eks"].other.contains_key("exec"));
}

#[test]
fn malformed_file_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kubeconfig");
    let garbage = "clusters: {{{ not yaml";
    fs::write(&path, garbage).unwrap();

    let err = setup_kube_config(&test_setup(&path, false)).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    assert_eq!(fs::read_to_string(&path).unwrap(), garbage);
}

#[test]
fn missing_parent_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".kube").join("config");

    setup_kube_config(&test_setup(&path, false)).unwrap();

    assert_eq!(read_config_or_new(&path).unwrap().current_context, "test");
}

#[test]
fn write_then_read_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");

    let mut kc = KubeConfig::new();
    let mut cluster = ClusterSpec::new("https://192.168.99.100:8443");
    cluster.certificate_authority = Some("/home/tux/.minikube/apiserver.crt".into());
    cluster.insecure_skip_tls_verify = Some(false);
    kc.set_cluster("minikube", cluster);
    kc.set_user(
        "minikube",
        UserSpec {
            client_certificate: Some("/home/tux/.minikube/apiserver.crt".into()),
            client_key: Some("/home/tux/.minikube/apiserver.key".into()),
            token: Some("s3cr3t".into()),
            username: Some("tux".into()),
            password: Some("hunter2".into()),
            ..UserSpec::default()
        },
    );
    kc.set_context("minikube", ContextSpec::new("minikube", "minikube"));
    kc.current_context = "minikube".into();
    kc.extensions.push(NamedExtension {
        name: "minikube".into(),
        extension: serde_yaml::from_str("{version: v1.0.0}").unwrap(),
    });

    write_config(&kc, &path).unwrap();
    let actual = read_config_or_new(&path).unwrap();

    assert_eq!(actual, kc);
}

#[test]
fn unwritable_location_is_a_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, LA_CROIX).unwrap();

    let err = write_config(&KubeConfig::new(), blocker.join("kubeconfig")).unwrap_err();
    assert!(matches!(err, Error::Write { .. }), "{err:?}");
    assert_eq!(fs::read_to_string(&blocker).unwrap(), LA_CROIX);
}

#[cfg(unix)]
#[test]
fn failed_write_keeps_existing_config() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let kube_dir = dir.path().join(".kube");
    fs::create_dir(&kube_dir).unwrap();
    let path = kube_dir.join("config");
    fs::write(&path, LA_CROIX).unwrap();
    fs::set_permissions(&kube_dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users can still create files in a read-only directory.
    let writable = fs::File::create(kube_dir.join("check")).is_ok();
    let result = if writable {
        None
    } else {
        Some(setup_kube_config(&test_setup(&path, false)))
    };
    fs::set_permissions(&kube_dir, fs::Permissions::from_mode(0o755)).unwrap();

    if let Some(result) = result {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Write { .. }), "{err:?}");
        assert_eq!(fs::read_to_string(&path).unwrap(), LA_CROIX);
        assert_eq!(read_config_or_new(&path).unwrap().current_context, "la-croix");
    }
}

#[cfg(unix)]
#[test]
fn setup_through_symlink_updates_target() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real");
    fs::write(&real, LA_CROIX).unwrap();
    let link = dir.path().join("config");
    symlink(&real, &link).unwrap();

    setup_kube_config(&test_setup(&link, false)).unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    let kc = read_config_or_new(&real).unwrap();
    assert_eq!(kc.current_context, "test");
    assert!(kc.clusters.contains_key("la-croix"));
    assert!(kc.clusters.contains_key("test"));
}
